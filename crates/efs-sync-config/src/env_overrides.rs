use crate::{LambdaConfig, LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "EFS_SYNC_";

/// Abstraction over environment-variable lookups so tests can supply
/// their own source of overrides.
pub trait EnvSource {
    /// Get a variable by its key WITHOUT the EFS_SYNC_ prefix
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Mount
    if let Some(base) = get_env_string(env, "MOUNT_BASE") {
        config.mount.base = base;
    }

    // Download
    if let Some(tmp_dir) = get_env_string(env, "TMP_DIR") {
        config.download.tmp_dir = tmp_dir;
    }
    if let Some(user_agent) = get_env_string(env, "USER_AGENT") {
        config.download.user_agent = user_agent;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .with_context(|| format!("Invalid {}LOG_FORMAT value", ENV_PREFIX))?;
    }

    // Lambda
    if let Some(ansi) = get_env_bool(env, "LAMBDA_ANSI_LOGS")? {
        config
            .lambda
            .get_or_insert_with(LambdaConfig::default)
            .ansi_logs = ansi;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|val| !val.trim().is_empty())
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val.parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Platform;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn overrides_win_over_defaults() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        let env = MapEnv(HashMap::from([
            ("MOUNT_BASE", "/mnt/efs"),
            ("TMP_DIR", "/scratch"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "json"),
        ]));

        apply_env_overrides(&mut config, &env).unwrap();

        assert_eq!(config.mount.base, "/mnt/efs");
        assert_eq!(config.download.tmp_dir, "/scratch");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Lambda);
        let file: crate::FileConfig = toml::from_str(
            "[mount]\nbase = \"/from-file\"\n\n[logging]\nlevel = \"warn\"\nformat = \"text\"\n",
        )
        .unwrap();
        config.merge(file);
        assert_eq!(config.mount.base, "/from-file");

        let env = MapEnv(HashMap::from([("MOUNT_BASE", "/from-env")]));
        apply_env_overrides(&mut config, &env).unwrap();

        assert_eq!(config.mount.base, "/from-env");
        // Keys the environment leaves alone keep the file's value
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn blank_values_are_ignored() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Lambda);
        let env = MapEnv(HashMap::from([("MOUNT_BASE", "  ")]));

        apply_env_overrides(&mut config, &env).unwrap();

        assert_eq!(config.mount.base, "/mnt");
    }

    #[test]
    fn bad_values_are_errors() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        let env = MapEnv(HashMap::from([("LOG_FORMAT", "yaml")]));
        assert!(apply_env_overrides(&mut config, &env).is_err());

        let env = MapEnv(HashMap::from([("LAMBDA_ANSI_LOGS", "maybe")]));
        assert!(apply_env_overrides(&mut config, &env).is_err());
    }

    #[test]
    fn ansi_override_creates_lambda_section() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        let env = MapEnv(HashMap::from([("LAMBDA_ANSI_LOGS", "true")]));

        apply_env_overrides(&mut config, &env).unwrap();

        assert!(config.lambda.unwrap().ansi_logs);
    }
}
