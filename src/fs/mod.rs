//! Remote directory model and path helpers.

pub(crate) mod entry;
pub(crate) mod path;
mod quota;

pub use entry::{EntryKind, ListingResult, NavigationResult, RemoteDirEntry, UploadOutcome};
pub use path::{join_remote, normalize_path, path_segments, trim_trailing_slashes};
pub use quota::{translate_units, Quota};
