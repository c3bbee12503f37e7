// Local sync command
//
// Runs the same fetch-and-extract the Lambda performs, against a directory
// on this machine. Handy for checking an archive before wiring it into a stack.

use anyhow::{Context, Result};
use clap::Args;
use efs_sync_config::RuntimeConfig;
use efs_sync_core::{ArchiveSource, ArchiveSyncer, DestinationPath, SyncOptions, SyncReport};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct SyncArgs {
    /// URL of the zip archive
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Root directory below the mount base
    #[arg(long, value_name = "DIR")]
    pub root: String,

    /// Optional subdirectory below the root directory
    #[arg(long, value_name = "DIR", default_value = "")]
    pub sub_dir: String,

    /// Mount base (overrides config)
    #[arg(long, value_name = "DIR")]
    pub mount_base: Option<PathBuf>,

    /// Staging directory for the download (overrides config)
    #[arg(long, value_name = "DIR")]
    pub tmp_dir: Option<PathBuf>,
}

/// Apply CLI overrides (highest priority) on top of the loaded config
pub fn apply_cli_overrides(config: &mut RuntimeConfig, args: &SyncArgs) {
    if let Some(base) = &args.mount_base {
        config.mount.base = base.to_string_lossy().into_owned();
    }
    if let Some(tmp_dir) = &args.tmp_dir {
        config.download.tmp_dir = tmp_dir.to_string_lossy().into_owned();
    }
}

pub async fn run(config: &RuntimeConfig, args: &SyncArgs) -> Result<SyncReport> {
    let source = ArchiveSource::parse(&args.url)?;
    let destination = DestinationPath::new(&args.root, &args.sub_dir)?;

    let client = reqwest::Client::builder()
        .user_agent(config.download.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")?;

    let syncer = ArchiveSyncer::new(
        client,
        SyncOptions {
            mount_base: config.mount.base_path().to_path_buf(),
            tmp_dir: config.download.tmp_path(),
        },
    );

    let report = syncer
        .sync(&source, &destination)
        .await
        .with_context(|| format!("Failed to sync {} into {}", source, destination))?;

    info!(
        destination = %report.destination.display(),
        files = report.files_written,
        bytes = report.bytes_downloaded,
        "Sync finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use efs_sync_config::Platform;

    fn args() -> SyncArgs {
        SyncArgs {
            url: "https://example.com/site.zip".to_string(),
            root: "files".to_string(),
            sub_dir: String::new(),
            mount_base: Some(PathBuf::from("/srv/volume")),
            tmp_dir: None,
        }
    }

    #[test]
    fn cli_overrides_replace_config_values() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        let original_tmp = config.download.tmp_dir.clone();

        apply_cli_overrides(&mut config, &args());

        assert_eq!(config.mount.base, "/srv/volume");
        assert_eq!(config.download.tmp_dir, original_tmp);
    }

    #[tokio::test]
    async fn invalid_destination_fails_before_download() {
        let config = RuntimeConfig::from_platform_defaults(Platform::Local);
        let mut args = args();
        args.sub_dir = "../outside".to_string();

        let err = run(&config, &args).await.unwrap_err();
        assert!(err.to_string().contains("E104"));
    }
}
