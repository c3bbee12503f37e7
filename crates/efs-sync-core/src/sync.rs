// Fetch-and-extract: one full resync of an archive onto the volume
//
// The download finishes before the destination is created or written, so a
// fetch failure leaves the volume as it was.

use crate::destination::DestinationPath;
use crate::error::{Result, SyncError};
use crate::extract::{extract_archive, ExtractStats};
use crate::fetch::{download_to_file, ArchiveSource};
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Where the volume is mounted and where downloads are staged
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mount_base: PathBuf,
    pub tmp_dir: PathBuf,
}

/// Outcome of a successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncReport {
    pub destination: PathBuf,
    pub bytes_downloaded: u64,
    pub files_written: usize,
    pub directories_created: usize,
}

#[derive(Debug, Clone)]
pub struct ArchiveSyncer {
    client: Client,
    options: SyncOptions,
}

impl ArchiveSyncer {
    pub fn new(client: Client, options: SyncOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Download `source` and extract it over `destination`.
    pub async fn sync(
        &self,
        source: &ArchiveSource,
        destination: &DestinationPath,
    ) -> Result<SyncReport> {
        let started = Instant::now();
        let dest_dir = destination.resolve(&self.options.mount_base);

        info!(
            source = %source,
            destination = %dest_dir.display(),
            "Starting archive sync"
        );

        let downloaded = download_to_file(&self.client, source, &self.options.tmp_dir).await?;
        let bytes_downloaded = downloaded.bytes;

        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(|e| SyncError::fs(&dest_dir, e))?;

        let extract_dir = dest_dir.clone();
        let stats: ExtractStats = tokio::task::spawn_blocking(move || {
            // `downloaded` moves in so the temp file outlives extraction
            extract_archive(downloaded.path(), &extract_dir)
        })
        .await
        .map_err(|e| SyncError::fs(&dest_dir, std::io::Error::other(e.to_string())))??;

        info!(
            destination = %dest_dir.display(),
            bytes = bytes_downloaded,
            files = stats.files_written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Archive sync complete"
        );

        Ok(SyncReport {
            destination: dest_dir,
            bytes_downloaded,
            files_written: stats.files_written,
            directories_created: stats.directories_created,
        })
    }
}
