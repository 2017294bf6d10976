//! Removal of remote files that were not refreshed during a run.
//!
//! The protocol can only list the current directory and has no diff call,
//! so the tracker rides on the synchronizer's own navigation: the first
//! time a cleanup root becomes current it records the files found there,
//! every upload into that root strikes its file from the record, and
//! whatever is left at the end is stale.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use super::report::{CleanupReport, RootCleanup, RootReport, SkipReason};
use crate::error::Result;
use crate::fs::{join_remote, normalize_path, NavigationResult, RemoteDirEntry, UploadOutcome};
use crate::session::{EventHandler, EventKind, Session, SessionEvent};

/// Pre-existing files of one cleanup root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupSnapshot {
    /// Files present on first visit, minus those uploaded since.
    /// `None` until the root has been visited.
    pub entries: Option<BTreeMap<String, RemoteDirEntry>>,
    /// Whether anything was uploaded into the root this run.
    pub touched_by_upload: bool,
}

/// Tracks cleanup roots through session events and deletes stale files.
#[derive(Debug)]
pub struct StaleFileTracker {
    /// Snapshots in configuration order.
    roots: Mutex<Vec<(String, CleanupSnapshot)>>,
}

impl StaleFileTracker {
    /// Create a tracker for `roots`. Trailing slashes are ignored and
    /// duplicates collapse onto the first occurrence.
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seeded: Vec<(String, CleanupSnapshot)> = Vec::new();
        for root in roots {
            let root = normalize_path(root.as_ref());
            if !seeded.iter().any(|(r, _)| *r == root) {
                seeded.push((root, CleanupSnapshot::default()));
            }
        }
        Self {
            roots: Mutex::new(seeded),
        }
    }

    /// Create a tracker and subscribe it to `session`.
    pub fn attach<I, S>(roots: I, session: &Session) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tracker = Arc::new(Self::new(roots));
        session.subscribe(EventKind::ChangeDirectory, tracker.clone());
        session.subscribe(EventKind::Upload, tracker.clone());
        tracker
    }

    /// Configured roots, normalized.
    pub fn roots(&self) -> Vec<String> {
        self.roots.lock().iter().map(|(r, _)| r.clone()).collect()
    }

    /// Current snapshot of `root`, if it is a configured root.
    pub fn snapshot(&self, root: &str) -> Option<CleanupSnapshot> {
        let root = normalize_path(root);
        self.roots
            .lock()
            .iter()
            .find(|(r, _)| *r == root)
            .map(|(_, s)| s.clone())
    }

    async fn on_change_directory(&self, session: &Session, nav: &NavigationResult) -> Result<()> {
        let wanted = self
            .roots
            .lock()
            .iter()
            .any(|(r, s)| *r == nav.current_dir && s.entries.is_none());
        if !wanted {
            return Ok(());
        }

        let listing = session.list().await?;
        let files: BTreeMap<String, RemoteDirEntry> = listing
            .files()
            .map(|e| (e.name.clone(), e.clone()))
            .collect();
        info!(
            root = %nav.current_dir,
            files = files.len(),
            "captured cleanup snapshot"
        );

        let mut roots = self.roots.lock();
        if let Some((_, snapshot)) = roots.iter_mut().find(|(r, _)| *r == nav.current_dir) {
            if snapshot.entries.is_none() {
                snapshot.entries = Some(files);
            }
        }
        Ok(())
    }

    fn on_upload(&self, outcome: &UploadOutcome) {
        let mut roots = self.roots.lock();
        let Some((root, snapshot)) = roots.iter_mut().find(|(r, _)| *r == outcome.current_dir)
        else {
            return;
        };
        let Some(entries) = snapshot.entries.as_mut() else {
            return;
        };

        snapshot.touched_by_upload = true;
        if entries.remove(&outcome.file_name).is_some() {
            debug!(root = %root, file = %outcome.file_name, "file refreshed, keeping it");
        }
    }

    /// Delete the stale files of every root that was visited and uploaded
    /// into during this run.
    ///
    /// Consumes the snapshots. A failed removal is recorded for its root
    /// and does not stop the remaining roots.
    pub async fn cleanup(&self, session: &Session) -> CleanupReport {
        let roots: Vec<(String, CleanupSnapshot)> = self
            .roots
            .lock()
            .iter_mut()
            .map(|(r, s)| (r.clone(), std::mem::take(s)))
            .collect();

        let mut report = CleanupReport::default();
        for (root, snapshot) in roots {
            let action = Self::cleanup_root(session, &root, snapshot).await;
            report.roots.push(RootReport { root, action });
        }
        report
    }

    async fn cleanup_root(session: &Session, root: &str, snapshot: CleanupSnapshot) -> RootCleanup {
        let Some(entries) = snapshot.entries else {
            info!(root = %root, "cleanup root never visited, leaving it as-is");
            return RootCleanup::Skipped(SkipReason::NeverVisited);
        };
        if !snapshot.touched_by_upload {
            info!(root = %root, "nothing uploaded into cleanup root, leaving it as-is");
            return RootCleanup::Skipped(SkipReason::NoUploads);
        }

        let stale: Vec<String> = entries.keys().map(|name| join_remote(root, name)).collect();
        if stale.is_empty() {
            info!(root = %root, "no stale files");
            return RootCleanup::Skipped(SkipReason::NothingStale);
        }

        info!(root = %root, count = stale.len(), "cleaning up directory");
        debug!(paths = ?stale, "entries to remove");
        match session.remove_paths(&stale).await {
            Ok(()) => RootCleanup::Removed(stale),
            Err(e) => {
                error!(root = %root, error = %e, "cleanup failed");
                RootCleanup::Failed(e)
            }
        }
    }
}

#[async_trait]
impl EventHandler for StaleFileTracker {
    async fn handle(&self, session: &Session, event: &SessionEvent<'_>) -> Result<()> {
        match event {
            SessionEvent::ChangeDirectory { result, .. } => {
                self.on_change_directory(session, result).await
            }
            SessionEvent::Upload { outcome, .. } => {
                self.on_upload(outcome);
                Ok(())
            }
        }
    }
}
