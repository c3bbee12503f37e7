//! Error types for archive sync operations.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E101: Archive download failed
    E101Fetch,
    /// E102: Archive could not be read as a zip file
    E102Archive,
    /// E103: Local filesystem operation failed
    E103Filesystem,
    /// E104: Destination path rejected
    E104InvalidDestination,
    /// E105: Archive URL rejected
    E105InvalidSource,
    /// E106: Archive entry would land outside the destination
    E106UnsafeEntry,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E101Fetch => "E101",
            Self::E102Archive => "E102",
            Self::E103Filesystem => "E103",
            Self::E104InvalidDestination => "E104",
            Self::E105InvalidSource => "E105",
            Self::E106UnsafeEntry => "E106",
        }
    }
}

/// Errors that can occur while fetching and extracting an archive
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("[E101] Failed to fetch archive from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("[E102] Invalid zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("[E103] Filesystem operation failed on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[E104] Invalid destination path: {0}")]
    InvalidDestination(String),

    #[error("[E105] Invalid archive URL '{url}': {message}")]
    InvalidSource { url: String, message: String },

    #[error("[E106] Archive entry '{0}' escapes the destination directory")]
    UnsafeEntry(String),
}

impl SyncError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Fetch { .. } => ErrorCode::E101Fetch,
            Self::Archive(_) => ErrorCode::E102Archive,
            Self::Filesystem { .. } => ErrorCode::E103Filesystem,
            Self::InvalidDestination(_) => ErrorCode::E104InvalidDestination,
            Self::InvalidSource { .. } => ErrorCode::E105InvalidSource,
            Self::UnsafeEntry(_) => ErrorCode::E106UnsafeEntry,
        }
    }

    pub(crate) fn fetch(url: &str, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for SyncError
pub type Result<T> = std::result::Result<T, SyncError>;
