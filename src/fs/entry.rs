//! Remote directory entries and the results of session calls.

use super::quota::Quota;

/// Kind of a remote directory child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Folder/directory
    Folder,
}

impl EntryKind {
    /// Parse the manager's `type` field. Unknown kinds yield `None`.
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "file" => Some(EntryKind::File),
            "folder" => Some(EntryKind::Folder),
            _ => None,
        }
    }
}

/// One child of a remote directory, as seen by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDirEntry {
    pub kind: EntryKind,
    pub name: String,
}

impl RemoteDirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            name: name.into(),
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Folder,
            name: name.into(),
        }
    }

    /// Check if this entry is a file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Result of a change-directory call.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    /// Absolute, `/`-rooted directory the server now considers current.
    pub current_dir: String,
    /// Names of the child folders of `current_dir`, in server order.
    pub child_folders: Vec<String>,
    /// Site quota, only reported when navigating to the root.
    pub quota: Option<Quota>,
}

impl NavigationResult {
    /// Check whether `name` is a child folder of the current directory.
    pub fn has_child_folder(&self, name: &str) -> bool {
        self.child_folders.iter().any(|f| f == name)
    }
}

/// Result of listing the current directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingResult {
    pub current_dir: String,
    pub entries: Vec<RemoteDirEntry>,
}

impl ListingResult {
    /// Iterate over the file entries only.
    pub fn files(&self) -> impl Iterator<Item = &RemoteDirEntry> {
        self.entries.iter().filter(|e| e.is_file())
    }
}

/// Outcome of a single file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub succeeded: bool,
    /// Session directory at the time the upload was issued.
    pub current_dir: String,
    pub file_name: String,
    pub local_path: String,
    pub remote_path: String,
}
