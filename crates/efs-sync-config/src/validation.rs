// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_mount_config(&config.mount, config.lambda.is_some())?;
    validate_download_config(&config.download)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_mount_config(config: &MountConfig, on_lambda: bool) -> Result<()> {
    if config.base.trim().is_empty() {
        bail!("mount.base must not be empty");
    }

    // Lambda file system mounts are always absolute
    if on_lambda && !config.base_path().is_absolute() {
        bail!(
            "mount.base must be an absolute path on Lambda, got '{}'",
            config.base
        );
    }

    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<()> {
    if config.tmp_dir.trim().is_empty() {
        bail!("download.tmp_dir must not be empty");
    }

    if config.user_agent.trim().is_empty() {
        bail!("download.user_agent must not be empty");
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    let level = config.level.trim().to_lowercase();
    if level.is_empty() {
        bail!("logging.level must not be empty");
    }

    // Directive strings like "efs_sync=debug,info" are passed through to the filter
    if !level.contains('=') && !level.contains(',') && !LOG_LEVELS.contains(&level.as_str()) {
        bail!(
            "logging.level '{}' is not one of: {}",
            config.level,
            LOG_LEVELS.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mount_config() {
        let local = MountConfig {
            base: ".".to_string(),
        };
        assert!(validate_mount_config(&local, false).is_ok());
        assert!(validate_mount_config(&local, true).is_err());

        let empty = MountConfig {
            base: String::new(),
        };
        assert!(validate_mount_config(&empty, false).is_err());
    }

    #[test]
    fn test_validate_logging_config() {
        let mut logging = LoggingConfig::default();
        assert!(validate_logging_config(&logging).is_ok());

        logging.level = "efs_sync_core=debug,info".to_string();
        assert!(validate_logging_config(&logging).is_ok());

        logging.level = "loud".to_string();
        assert!(validate_logging_config(&logging).is_err());
    }

    #[test]
    fn test_platform_defaults_are_valid() {
        assert!(validate_config(&RuntimeConfig::from_platform_defaults(Platform::Lambda)).is_ok());
        assert!(validate_config(&RuntimeConfig::from_platform_defaults(Platform::Local)).is_ok());
    }
}
