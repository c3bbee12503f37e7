// Archive download
//
// Streams the response body chunk by chunk into a temp file so large
// archives never sit fully in memory.

use crate::error::{Result, SyncError};
use reqwest::{Client, Url};
use std::fmt;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Location of the zip archive to sync from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    url: Url,
}

impl ArchiveSource {
    /// Parse an archive URL. Only `http` and `https` are accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| SyncError::InvalidSource {
            url: raw.to_string(),
            message: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(SyncError::InvalidSource {
                url: raw.to_string(),
                message: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// A downloaded archive; the backing file is deleted on drop
#[derive(Debug)]
pub struct Downloaded {
    pub file: NamedTempFile,
    pub bytes: u64,
}

impl Downloaded {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Download `source` into a fresh temp file inside `tmp_dir`
pub async fn download_to_file(
    client: &Client,
    source: &ArchiveSource,
    tmp_dir: &Path,
) -> Result<Downloaded> {
    let url = source.url().as_str();

    let mut response = client
        .get(source.url().clone())
        .send()
        .await
        .map_err(|e| SyncError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::fetch(url, format!("HTTP status {}", status)));
    }

    let temp = tempfile::Builder::new()
        .prefix("efs-sync-")
        .suffix(".zip")
        .tempfile_in(tmp_dir)
        .map_err(|e| SyncError::fs(tmp_dir, e))?;

    let handle = temp.reopen().map_err(|e| SyncError::fs(temp.path(), e))?;
    let mut writer = tokio::fs::File::from_std(handle);

    let mut bytes = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| SyncError::fetch(url, e))? {
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| SyncError::fs(temp.path(), e))?;
        bytes += chunk.len() as u64;
    }
    writer
        .flush()
        .await
        .map_err(|e| SyncError::fs(temp.path(), e))?;
    writer
        .sync_all()
        .await
        .map_err(|e| SyncError::fs(temp.path(), e))?;

    debug!(url, bytes, path = %temp.path().display(), "archive downloaded");

    Ok(Downloaded { file: temp, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(ArchiveSource::parse("https://example.com/site.zip").is_ok());
        assert!(ArchiveSource::parse("http://example.com/site.zip?v=2").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        let err = ArchiveSource::parse("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, SyncError::InvalidSource { .. }));
        assert!(ArchiveSource::parse("s3://bucket/key.zip").is_err());
        assert!(ArchiveSource::parse("not a url").is_err());
    }
}
