//! Recursive mirroring of a local tree into the manager.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::{debug, error, info};

use super::report::{DirectoryReport, FileUpload, SubtreeOutcome};
use crate::error::{Result, SyncError};
use crate::fs::{join_remote, normalize_path};
use crate::session::Session;

/// Drives a [`Session`] to mirror a local directory tree.
///
/// Directories are processed one at a time, depth-first. Within a
/// directory every file is uploaded concurrently, and only after the whole
/// batch has settled does the walk descend into subdirectories, so the
/// session's current directory never moves while an upload is in flight.
pub struct Synchronizer<'a> {
    session: &'a Session,
}

impl<'a> Synchronizer<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Connect, make sure `remote_root` exists and mirror `local_root` into it.
    ///
    /// Fails only if connecting or preparing the remote root fails. Errors
    /// inside the tree are contained in the returned report.
    pub async fn upload(&self, local_root: &Path, remote_root: &str) -> Result<DirectoryReport> {
        self.session.connect().await?;

        let remote_root = normalize_path(remote_root);
        self.session.ensure_folder_path(&remote_root).await?;

        let report = self.sync_dir(local_root.to_path_buf(), remote_root).await;
        info!(
            uploaded = report.uploaded_count(),
            failed = report.failed_uploads().len(),
            aborted = report.aborted().len(),
            "synchronization finished"
        );
        Ok(report)
    }

    /// Process one directory pair; never fails, the outcome says how it went.
    fn sync_dir(&self, local_dir: PathBuf, remote_dir: String) -> BoxFuture<'_, DirectoryReport> {
        async move {
            let mut report = DirectoryReport::new(local_dir, remote_dir);
            let local_dir = report.local_dir.clone();
            let remote_dir = report.remote_dir.clone();

            report.outcome = match self.process(&local_dir, &remote_dir, &mut report).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        local = %local_dir.display(),
                        remote = %remote_dir,
                        error = %e,
                        "directory aborted"
                    );
                    SubtreeOutcome::Aborted(e)
                }
            };
            report
        }
        .boxed()
    }

    async fn process(
        &self,
        local_dir: &Path,
        remote_dir: &str,
        report: &mut DirectoryReport,
    ) -> Result<SubtreeOutcome> {
        let (files, dirs) = read_local_dir(local_dir).await?;
        if files.is_empty() && dirs.is_empty() {
            debug!(local = %local_dir.display(), "nothing to upload");
            return Ok(SubtreeOutcome::Empty);
        }

        let nav = self.session.change_directory(remote_dir).await?;

        let pending = files.iter().map(|name| {
            let local_path = local_dir.join(name);
            async move {
                debug!(local = %local_path.display(), "uploading file");
                let result = self.session.upload(&local_path).await;
                FileUpload { local_path, result }
            }
        });
        report.uploads = join_all(pending).await;

        for upload in &report.uploads {
            match &upload.result {
                Ok(outcome) if outcome.succeeded => {
                    info!("upload '{}' ... success.", upload.local_path.display())
                }
                Ok(_) => error!("upload '{}' ... failed.", upload.local_path.display()),
                Err(e) => error!(
                    "upload '{}' ... failed: {}",
                    upload.local_path.display(),
                    e
                ),
            }
        }

        for dir in dirs {
            let name = dir.to_string_lossy().into_owned();
            let remote_child = join_remote(remote_dir, &name);

            if !nav.has_child_folder(&name) {
                debug!(remote = %remote_child, "need to add folder");
                self.session.create_folder(&remote_child).await?;
            }

            let child = self.sync_dir(local_dir.join(&dir), remote_child).await;
            report.children.push(child);
        }

        Ok(SubtreeOutcome::Completed)
    }
}

/// Split the immediate children of `dir` into files and directories.
///
/// Anything else (symlinks, sockets, ...) is ignored. Names come back in
/// sorted order so runs are reproducible.
async fn read_local_dir(dir: &Path) -> Result<(Vec<OsString>, Vec<OsString>)> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SyncError::io(dir, e))?;
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SyncError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| SyncError::io(entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push(entry.file_name());
        } else if file_type.is_file() {
            files.push(entry.file_name());
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::Credentials;
    use crate::testing::{ApiCall, FakeManager};

    fn session(fake: &Arc<FakeManager>) -> Session {
        Session::new(
            fake.clone(),
            Credentials {
                server: "ftp.example.com".to_string(),
                username: "deploy".to_string(),
                password: "secret".to_string(),
            },
        )
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn position(calls: &[ApiCall], wanted: &ApiCall) -> usize {
        calls
            .iter()
            .position(|c| c == wanted)
            .unwrap_or_else(|| panic!("missing call {:?} in {:?}", wanted, calls))
    }

    fn cd(path: &[&str]) -> ApiCall {
        ApiCall::UpdateTreeList(path.iter().map(|s| s.to_string()).collect())
    }

    fn up(dir: &str, name: &str) -> ApiCall {
        ApiCall::Upload {
            dir: dir.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mirrors_tree() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "index.html", "<html>");
        write(local.path(), "css/site.css", "body {}");
        write(local.path(), "css/vendor/reset.css", "* {}");

        let fake = Arc::new(FakeManager::new());
        let session = session(&fake);
        let report = Synchronizer::new(&session)
            .upload(local.path(), "/www/")
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.uploaded_count(), 3);
        assert_eq!(report.remote_dir, "/www");
        assert_eq!(fake.file("/www/index.html"), Some(b"<html>".to_vec()));
        assert_eq!(fake.file("/www/css/site.css"), Some(b"body {}".to_vec()));
        assert_eq!(
            fake.file("/www/css/vendor/reset.css"),
            Some(b"* {}".to_vec())
        );
    }

    #[tokio::test]
    async fn test_directory_batch_is_uploaded_concurrently() {
        let local = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
            write(local.path(), name, name);
        }

        // Each upload blocks until all four are pending; a sequential
        // dispatch would never get past the first one.
        let fake = Arc::new(FakeManager::new());
        fake.hold_uploads_until(4);
        let session = session(&fake);
        let report = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            Synchronizer::new(&session).upload(local.path(), "/site"),
        )
        .await
        .expect("uploads of one directory were not in flight together")
        .unwrap();

        assert_eq!(report.uploaded_count(), 4);
        for upload in &report.uploads {
            let outcome = upload.result.as_ref().unwrap();
            assert_eq!(outcome.current_dir, "/site");
            assert_eq!(outcome.remote_path, format!("/site/{}", outcome.file_name));
        }
        let landed: Vec<_> = fake
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Upload { dir, .. } => Some(dir),
                _ => None,
            })
            .collect();
        assert_eq!(landed, vec!["/site"; 4]);
        assert_eq!(session.current_dir(), "/site");
    }

    #[tokio::test]
    async fn test_files_before_subdirectories() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "a.txt", "a");
        write(local.path(), "b.txt", "b");
        write(local.path(), "sub/c.txt", "c");

        let fake = Arc::new(FakeManager::new());
        fake.add_dir("/site/sub");
        let session = session(&fake);
        Synchronizer::new(&session)
            .upload(local.path(), "/site")
            .await
            .unwrap();

        let calls = fake.calls();
        let enter_site = calls
            .iter()
            .rposition(|c| c == &cd(&["site"]))
            .unwrap();
        let upload_a = position(&calls, &up("/site", "a.txt"));
        let upload_b = position(&calls, &up("/site", "b.txt"));
        let enter_sub = position(&calls, &cd(&["site", "sub"]));
        let upload_c = position(&calls, &up("/site/sub", "c.txt"));

        assert!(enter_site < upload_a && enter_site < upload_b);
        assert!(upload_a < enter_sub && upload_b < enter_sub);
        assert!(enter_sub < upload_c);
        // The folder already existed, so nothing was created.
        assert!(fake.folder_creations().is_empty());
    }

    #[tokio::test]
    async fn test_creates_missing_subfolders() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "docs/guide/intro.md", "# Intro");

        let fake = Arc::new(FakeManager::new());
        let session = session(&fake);
        let report = Synchronizer::new(&session)
            .upload(local.path(), "/")
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(
            fake.folder_creations(),
            vec!["/docs".to_string(), "/docs/guide".to_string()]
        );
        assert_eq!(fake.file("/docs/guide/intro.md"), Some(b"# Intro".to_vec()));
    }

    #[tokio::test]
    async fn test_empty_directory_makes_no_remote_calls() {
        let local = tempfile::tempdir().unwrap();
        std::fs::create_dir(local.path().join("empty")).unwrap();

        let fake = Arc::new(FakeManager::new());
        fake.add_dir("/site/empty");
        let session = session(&fake);
        let synchronizer = Synchronizer::new(&session);

        fake.clear_calls();
        let report = synchronizer
            .sync_dir(local.path().join("empty"), "/site/empty".to_string())
            .await;
        assert!(matches!(report.outcome, SubtreeOutcome::Empty));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_subdirectory_is_created_but_not_entered() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "keep.txt", "k");
        std::fs::create_dir(local.path().join("empty")).unwrap();

        let fake = Arc::new(FakeManager::new());
        let session = session(&fake);
        let report = Synchronizer::new(&session)
            .upload(local.path(), "/site")
            .await
            .unwrap();

        assert!(fake.has_dir("/site/empty"));
        assert!(!fake.calls().contains(&cd(&["site", "empty"])));
        assert!(matches!(report.children[0].outcome, SubtreeOutcome::Empty));
    }

    #[tokio::test]
    async fn test_failed_upload_is_isolated() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "bad.txt", "bad");
        write(local.path(), "good.txt", "good");
        write(local.path(), "sub/deep.txt", "deep");

        let fake = Arc::new(FakeManager::new());
        fake.reject_upload("bad.txt");
        let session = session(&fake);
        let report = Synchronizer::new(&session)
            .upload(local.path(), "/site")
            .await
            .unwrap();

        let failed = report.failed_uploads();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].local_path.ends_with("bad.txt"));
        assert!(matches!(report.outcome, SubtreeOutcome::Completed));
        assert_eq!(fake.file("/site/good.txt"), Some(b"good".to_vec()));
        assert_eq!(fake.file("/site/sub/deep.txt"), Some(b"deep".to_vec()));
        assert_eq!(report.uploaded_count(), 2);
    }

    #[tokio::test]
    async fn test_folder_failure_aborts_only_its_subtree() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "a/one.txt", "1");
        write(local.path(), "b/two.txt", "2");
        write(local.path(), "b/locked/three.txt", "3");
        write(local.path(), "b/z/four.txt", "4");
        write(local.path(), "c/five.txt", "5");

        let fake = Arc::new(FakeManager::new());
        fake.reject_folder("/site/b/locked", "Permission denied");
        let session = session(&fake);
        let report = Synchronizer::new(&session)
            .upload(local.path(), "/site")
            .await
            .unwrap();

        // "b" stops at "locked": its own files went out, "z" was never reached.
        let aborted = report.aborted();
        assert_eq!(aborted.len(), 1);
        assert_eq!(aborted[0].remote_dir, "/site/b");
        assert!(matches!(
            aborted[0].outcome,
            SubtreeOutcome::Aborted(SyncError::FolderCreate { .. })
        ));
        assert_eq!(fake.file("/site/b/two.txt"), Some(b"2".to_vec()));
        assert!(fake.file("/site/b/z/four.txt").is_none());

        // Siblings before and after are unaffected.
        assert_eq!(fake.file("/site/a/one.txt"), Some(b"1".to_vec()));
        assert_eq!(fake.file("/site/c/five.txt"), Some(b"5".to_vec()));
        assert!(matches!(report.outcome, SubtreeOutcome::Completed));
    }

    #[tokio::test]
    async fn test_missing_local_root_is_contained() {
        let local = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeManager::new());
        let session = session(&fake);

        let report = Synchronizer::new(&session)
            .upload(&local.path().join("nope"), "/site")
            .await
            .unwrap();
        assert!(matches!(
            report.outcome,
            SubtreeOutcome::Aborted(SyncError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_auth_failure_fails_the_run() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "a.txt", "a");
        let fake = Arc::new(FakeManager::new());
        fake.reject_login("Invalid credentials");
        let session = session(&fake);

        let err = Synchronizer::new(&session)
            .upload(local.path(), "/site")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Auth(_)));
        assert!(fake.upload_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_remote_root_creation_failure_fails_the_run() {
        let local = tempfile::tempdir().unwrap();
        write(local.path(), "a.txt", "a");
        let fake = Arc::new(FakeManager::new());
        fake.reject_folder("/site", "Quota exceeded");
        let session = session(&fake);

        let err = Synchronizer::new(&session)
            .upload(local.path(), "/site")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::FolderCreate { .. }));
    }
}
