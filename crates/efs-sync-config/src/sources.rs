// Configuration source loading.
//
// Priority order:
// 1. Environment variables (EFS_SYNC_* prefix)
// 2. Config file path from EFS_SYNC_CONFIG
// 3. Inline config content from EFS_SYNC_CONFIG_CONTENT
// 4. Default config files (./config.toml, ./.efs-sync.toml)
// 5. Platform defaults (based on auto-detected Platform)

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::platform::Platform;
use crate::{FileConfig, RuntimeConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

/// Load configuration for the given platform using environment/file access.
pub fn load_config(platform: Platform) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_platform_defaults(platform);

    if let Some(file_config) = load_from_file()? {
        config.merge(file_config);
    }

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file() -> Result<Option<FileConfig>> {
    if let Ok(path) = env::var(format!("{}CONFIG", ENV_PREFIX)) {
        return read_file(Path::new(&path)).map(Some);
    }

    if let Ok(content) = env::var(format!("{}CONFIG_CONTENT", ENV_PREFIX)) {
        let config: FileConfig = toml::from_str(&content)
            .context("Failed to parse inline config from EFS_SYNC_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for path in &["./config.toml", "./.efs-sync.toml"] {
        let path = Path::new(path);
        if path.exists() {
            return read_file(path).map(Some);
        }
    }

    Ok(None)
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let file_config = read_file(path.as_ref())?;

    let mut config = RuntimeConfig::from_platform_defaults(Platform::detect());
    config.merge(file_config);

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;

    config.validate()?;
    Ok(config)
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;

    #[test]
    fn platform_defaults_match_expectations() {
        let lambda = RuntimeConfig::from_platform_defaults(Platform::Lambda);
        assert_eq!(lambda.mount.base, "/mnt");
        assert_eq!(lambda.logging.format, LogFormat::Json);
        assert!(lambda.lambda.is_some());

        let local = RuntimeConfig::from_platform_defaults(Platform::Local);
        assert_eq!(local.logging.format, LogFormat::Text);
        assert!(local.lambda.is_none());
    }

    #[test]
    fn explicit_file_is_merged_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("efs-sync.toml");
        std::fs::write(
            &path,
            "[download]\ntmp_dir = \"/var/tmp\"\n\n[logging]\nlevel = \"warn\"\nformat = \"text\"\n",
        )
        .unwrap();

        let config = read_file(&path).unwrap();
        let mut merged = RuntimeConfig::from_platform_defaults(Platform::Lambda);
        merged.merge(config);

        assert_eq!(merged.download.tmp_dir, "/var/tmp");
        assert_eq!(merged.logging.level, "warn");
        assert_eq!(merged.mount.base, "/mnt");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_from_file_path("/definitely/not/here.toml").is_err());
    }
}
