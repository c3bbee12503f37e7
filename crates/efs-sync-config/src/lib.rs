// efs-sync-config - Unified configuration for the Lambda handler and CLI
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from EFS_SYNC_CONFIG env var
// 3. Config file contents from EFS_SYNC_CONFIG_CONTENT env var
// 4. Default config file locations (./config.toml, ./.efs-sync.toml)
// 5. Platform-specific defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod env_overrides;
mod platform;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use platform::{Platform, PlatformDefaults};

/// Main runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub mount: MountConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda: Option<LambdaConfig>,
}

/// Config as read from a file: only the sections present override defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub mount: Option<MountConfig>,
    pub download: Option<DownloadConfig>,
    pub logging: Option<LoggingConfig>,
    pub lambda: Option<LambdaConfig>,
}

/// Where the network volume is visible on the local filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Directory that contains the volume's mount point(s).
    /// Destination paths resolve relative to it.
    pub base: String,
}

impl MountConfig {
    pub fn base_path(&self) -> &Path {
        Path::new(&self.base)
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            base: "/mnt".to_string(),
        }
    }
}

/// Archive download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory for staging the downloaded archive
    pub tmp_dir: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    concat!("efs-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

impl DownloadConfig {
    pub fn tmp_path(&self) -> PathBuf {
        PathBuf::from(&self.tmp_dir)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            tmp_dir: "/tmp".to_string(),
            user_agent: default_user_agent(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// True when the filter enables `trace` globally
    pub fn is_trace(&self) -> bool {
        self.level.trim().eq_ignore_ascii_case("trace")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

/// Lambda-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LambdaConfig {
    /// Emit ANSI colors in log output (CloudWatch renders them as noise)
    #[serde(default)]
    pub ansi_logs: bool,
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        let platform = Platform::detect();
        sources::load_config(platform)
    }

    /// Load configuration for a specific platform (useful for testing)
    pub fn load_for_platform(platform: Platform) -> Result<Self> {
        sources::load_config(platform)
    }

    /// Load from an explicit file path (CLI --config flag)
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Platform defaults with no file or environment applied
    pub fn from_platform_defaults(platform: Platform) -> Self {
        let defaults = platform.defaults();
        Self {
            mount: MountConfig {
                base: defaults.mount_base.to_string(),
            },
            download: DownloadConfig {
                tmp_dir: defaults.tmp_dir,
                user_agent: default_user_agent(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: defaults.log_format,
            },
            lambda: match platform {
                Platform::Lambda => Some(LambdaConfig::default()),
                Platform::Local => None,
            },
        }
    }

    /// Overlay the sections present in a file-sourced config
    pub fn merge(&mut self, file: FileConfig) {
        if let Some(mount) = file.mount {
            self.mount = mount;
        }
        if let Some(download) = file.download {
            self.download = download;
        }
        if let Some(logging) = file.logging {
            self.logging = logging;
        }
        if file.lambda.is_some() {
            self.lambda = file.lambda;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
