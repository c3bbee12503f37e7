// Destination path composition
//
// A destination is a root directory plus an optional subdirectory, relative
// to the volume's mount base. Every segment must be a plain name so the
// resolved path can never leave the mount.

use crate::error::{Result, SyncError};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Extraction target relative to the mount base, e.g. `files/foobar`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    relative: PathBuf,
}

impl DestinationPath {
    /// Compose `root` and `sub_dir`. An empty `sub_dir` targets `root` itself.
    ///
    /// Leading and trailing `/` are ignored on both parts, so the
    /// CloudFormation-style `/files` and `files` are equivalent.
    pub fn new(root: &str, sub_dir: &str) -> Result<Self> {
        let root = root.trim_matches('/');
        if root.is_empty() {
            return Err(SyncError::InvalidDestination(
                "root directory must not be empty".to_string(),
            ));
        }

        let mut relative = PathBuf::new();
        push_segments(&mut relative, root)?;
        push_segments(&mut relative, sub_dir.trim_matches('/'))?;

        Ok(Self { relative })
    }

    /// Path relative to the mount base
    pub fn as_path(&self) -> &Path {
        &self.relative
    }

    /// Absolute directory under `mount_base` that receives the archive contents
    pub fn resolve(&self, mount_base: &Path) -> PathBuf {
        mount_base.join(&self.relative)
    }
}

impl fmt::Display for DestinationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative.display())
    }
}

fn push_segments(path: &mut PathBuf, raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Ok(());
    }

    for segment in raw.split('/') {
        if segment.is_empty() {
            return Err(SyncError::InvalidDestination(format!(
                "empty path segment in '{}'",
                raw
            )));
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => path.push(name),
            _ => {
                return Err(SyncError::InvalidDestination(format!(
                    "segment '{}' in '{}' is not a plain directory name",
                    segment, raw
                )))
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_sub_dir_are_joined() {
        let dest = DestinationPath::new("files", "foobar").unwrap();
        assert_eq!(dest.as_path(), Path::new("files/foobar"));
    }

    #[test]
    fn empty_sub_dir_targets_root() {
        let dest = DestinationPath::new("files", "").unwrap();
        assert_eq!(dest.as_path(), Path::new("files"));
    }

    #[test]
    fn slashes_are_trimmed() {
        let dest = DestinationPath::new("/files/", "/a/b/").unwrap();
        assert_eq!(dest.as_path(), Path::new("files/a/b"));
        assert_eq!(dest.to_string(), "files/a/b");
    }

    #[test]
    fn resolves_under_mount_base() {
        let dest = DestinationPath::new("files", "foobar").unwrap();
        assert_eq!(
            dest.resolve(Path::new("/mnt")),
            PathBuf::from("/mnt/files/foobar")
        );
    }

    #[test]
    fn traversal_segments_are_rejected() {
        assert!(DestinationPath::new("..", "").is_err());
        assert!(DestinationPath::new("files", "../etc").is_err());
        assert!(DestinationPath::new("files", "a/./b").is_err());
        assert!(DestinationPath::new("files", "a//b").is_err());
    }

    #[test]
    fn empty_root_is_rejected() {
        assert!(DestinationPath::new("", "foobar").is_err());
        assert!(DestinationPath::new("/", "").is_err());
    }
}
