//! Mirroring of a local tree onto the remote and cleanup of stale files.

mod cleanup;
mod report;
mod uploader;

pub use cleanup::{CleanupSnapshot, StaleFileTracker};
pub use report::{
    CleanupReport, DirectoryReport, FileUpload, RootCleanup, RootReport, SkipReason,
    SubtreeOutcome,
};
pub use uploader::Synchronizer;
