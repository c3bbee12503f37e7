// Platform detection based on environment variables
//
// Auto-detects runtime environment:
// - AWS Lambda: AWS_LAMBDA_FUNCTION_NAME env var present
// - Local: otherwise (operator CLI, tests)

use crate::LogFormat;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Lambda,
    Local,
}

impl Platform {
    /// Auto-detect the current platform based on environment variables
    pub fn detect() -> Self {
        if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
            Platform::Lambda
        } else {
            Platform::Local
        }
    }

    /// Get platform-specific defaults
    pub fn defaults(&self) -> PlatformDefaults {
        match self {
            // EFS access points are mounted under /mnt; /tmp is the only writable ephemeral dir
            Platform::Lambda => PlatformDefaults {
                mount_base: "/mnt",
                tmp_dir: "/tmp".to_string(),
                log_format: LogFormat::Json,
            },
            Platform::Local => PlatformDefaults {
                mount_base: ".",
                tmp_dir: env::temp_dir().to_string_lossy().into_owned(),
                log_format: LogFormat::Text,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDefaults {
    pub mount_base: &'static str,
    pub tmp_dir: String,
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_defaults() {
        let lambda = Platform::Lambda.defaults();
        assert_eq!(lambda.mount_base, "/mnt");
        assert_eq!(lambda.tmp_dir, "/tmp");
        assert_eq!(lambda.log_format, LogFormat::Json);

        let local = Platform::Local.defaults();
        assert_eq!(local.mount_base, ".");
        assert_eq!(local.log_format, LogFormat::Text);
        assert!(!local.tmp_dir.is_empty());
    }
}
