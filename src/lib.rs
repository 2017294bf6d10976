//! # webftp-sync
//!
//! Mirror a local directory tree onto a web-hosting file manager that only
//! speaks its browser widget's AJAX protocol.
//!
//! ## Features
//!
//! - **Session**: cookie-based login, stateful navigation with a mirrored
//!   current directory, folder creation, listing, removal and single-part
//!   uploads.
//! - **Synchronization**: depth-first mirroring that creates missing remote
//!   folders and uploads each directory's files concurrently.
//! - **Cleanup**: optional deletion of files in chosen remote directories
//!   that were not refreshed by the run.
//! - **Reports**: per-file, per-subtree and per-cleanup-root outcomes.
//!
//! The session keeps one server-side "current directory". Listing and
//! uploading act relative to it, so anything that navigates must not run
//! concurrently with uploads into another directory.
//!
//! ## Example
//!
//! ```no_run
//! use webftp_sync::{Credentials, Session, StaleFileTracker, Synchronizer};
//!
//! # async fn example() -> webftp_sync::Result<()> {
//! let session = Session::with_http(
//!     "https://manager.infomaniak.com",
//!     Credentials {
//!         server: "ftp.example.com".to_string(),
//!         username: "deploy".to_string(),
//!         password: "secret".to_string(),
//!     },
//! )?;
//!
//! // Delete files under /www that this run does not upload again.
//! let tracker = StaleFileTracker::attach(["/www"], &session);
//!
//! let report = Synchronizer::new(&session)
//!     .upload("./public".as_ref(), "/www")
//!     .await?;
//! println!("{} files uploaded", report.uploaded_count());
//!
//! let cleanup = tracker.cleanup(&session).await;
//! println!("{} stale files removed", cleanup.removed_paths().len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod runner;
pub mod session;
pub mod sync;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use api::{ApiClient, Credentials, ManagerApi};
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use fs::{EntryKind, ListingResult, NavigationResult, Quota, RemoteDirEntry, UploadOutcome};
pub use runner::{run, RunSummary};
pub use session::{EventHandler, EventKind, Session, SessionEvent};
pub use sync::{CleanupReport, DirectoryReport, StaleFileTracker, Synchronizer};
