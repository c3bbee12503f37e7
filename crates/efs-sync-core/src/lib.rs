// efs-sync-core - Populate a mounted volume from a remote zip archive
//
// The whole operation is a full resync: download to a temp file, then
// extract every entry over the destination, overwriting name conflicts.
// There is no pruning and no rollback.

pub mod destination;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod sync;

pub use destination::DestinationPath;
pub use error::{ErrorCode, Result, SyncError};
pub use extract::{extract_archive, ExtractStats};
pub use fetch::{download_to_file, ArchiveSource, Downloaded};
pub use sync::{ArchiveSyncer, SyncOptions, SyncReport};
