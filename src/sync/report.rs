//! Outcomes of a synchronization run.
//!
//! Failures are contained at three levels: a single file (recorded in its
//! [`FileUpload`]), a directory subtree ([`SubtreeOutcome::Aborted`]) and a
//! cleanup root ([`RootCleanup::Failed`]). Only errors outside those
//! boundaries fail the run.

use std::path::PathBuf;

use crate::error::{Result, SyncError};
use crate::fs::UploadOutcome;

/// Result of uploading one local file.
#[derive(Debug)]
pub struct FileUpload {
    pub local_path: PathBuf,
    /// `Ok` once the server answered, even if it answered with a failure.
    pub result: Result<UploadOutcome>,
}

impl FileUpload {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.succeeded)
    }
}

/// How processing of one directory ended.
#[derive(Debug)]
pub enum SubtreeOutcome {
    /// Nothing to upload; no remote call was made.
    Empty,
    /// Files were dispatched and every subdirectory was visited.
    Completed,
    /// Processing stopped at the error; the rest of this subtree was skipped.
    Aborted(SyncError),
}

/// Report for one local directory and, recursively, its subdirectories.
#[derive(Debug)]
pub struct DirectoryReport {
    pub local_dir: PathBuf,
    pub remote_dir: String,
    pub outcome: SubtreeOutcome,
    pub uploads: Vec<FileUpload>,
    pub children: Vec<DirectoryReport>,
}

impl DirectoryReport {
    pub(crate) fn new(local_dir: PathBuf, remote_dir: String) -> Self {
        Self {
            local_dir,
            remote_dir,
            outcome: SubtreeOutcome::Completed,
            uploads: Vec::new(),
            children: Vec::new(),
        }
    }

    /// This report and all descendants, depth-first.
    pub fn walk(&self) -> Vec<&DirectoryReport> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    /// Number of files the server accepted in this subtree.
    pub fn uploaded_count(&self) -> usize {
        self.walk()
            .iter()
            .map(|r| r.uploads.iter().filter(|u| u.succeeded()).count())
            .sum()
    }

    /// Uploads in this subtree that errored or were rejected.
    pub fn failed_uploads(&self) -> Vec<&FileUpload> {
        self.walk()
            .into_iter()
            .flat_map(|r| r.uploads.iter().filter(|u| !u.succeeded()))
            .collect()
    }

    /// Directories in this subtree whose processing was aborted.
    pub fn aborted(&self) -> Vec<&DirectoryReport> {
        self.walk()
            .into_iter()
            .filter(|r| matches!(r.outcome, SubtreeOutcome::Aborted(_)))
            .collect()
    }

    /// True if every upload succeeded and no subtree was aborted.
    pub fn is_clean(&self) -> bool {
        self.failed_uploads().is_empty() && self.aborted().is_empty()
    }
}

/// Why a cleanup root was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory never became current during the run.
    NeverVisited,
    /// The directory was visited but nothing was uploaded into it.
    NoUploads,
    /// Every file that existed before the run was uploaded again.
    NothingStale,
}

/// What happened to one cleanup root.
#[derive(Debug)]
pub enum RootCleanup {
    Skipped(SkipReason),
    Removed(Vec<String>),
    Failed(SyncError),
}

#[derive(Debug)]
pub struct RootReport {
    pub root: String,
    pub action: RootCleanup,
}

/// Result of the end-of-run cleanup pass, in configuration order.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub roots: Vec<RootReport>,
}

impl CleanupReport {
    /// All remote paths that were deleted.
    pub fn removed_paths(&self) -> Vec<&str> {
        self.roots
            .iter()
            .flat_map(|r| match &r.action {
                RootCleanup::Removed(paths) => paths.iter().map(String::as_str).collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Roots whose removal call failed.
    pub fn failures(&self) -> Vec<&RootReport> {
        self.roots
            .iter()
            .filter(|r| matches!(r.action, RootCleanup::Failed(_)))
            .collect()
    }
}
