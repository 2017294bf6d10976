//! Directory navigation, listing and folder mutation.

use tracing::{debug, info};

use super::events::SessionEvent;
use super::Session;
use crate::error::{Result, SyncError};
use crate::fs::path::prefix_path;
use crate::fs::{normalize_path, path_segments, ListingResult, NavigationResult, Quota};

impl Session {
    /// Navigate to `path` and make it the current directory.
    ///
    /// `"/a/b/"`, `"a/b"` and `"/a/b"` all address the same directory; the
    /// empty path is the root. Navigating to the root also reports the
    /// site quota.
    pub async fn change_directory(&self, path: &str) -> Result<NavigationResult> {
        let segments = path_segments(path);
        let listing = self.api().update_tree_list(&segments).await?;

        let quota = if segments.is_empty() {
            listing
                .quotas
                .as_ref()
                .and_then(|q| q.site.as_ref())
                .map(Quota::from)
        } else {
            None
        };
        if let Some(quota) = &quota {
            info!("Quota: {}.", quota);
        }

        let result = NavigationResult {
            current_dir: listing.path.clone(),
            child_folders: listing.folder_names(),
            quota,
        };
        self.set_current_dir(&result.current_dir);
        debug!(
            requested = path,
            current_dir = %result.current_dir,
            folders = ?result.child_folders,
            "changed directory"
        );

        self.notify(SessionEvent::ChangeDirectory {
            requested: path,
            result: &result,
        })
        .await;

        Ok(result)
    }

    /// List the current directory.
    pub async fn list(&self) -> Result<ListingResult> {
        let contents = self.api().load_folder_selected().await?;
        let result = ListingResult {
            current_dir: self.current_dir(),
            entries: contents.entries(),
        };
        debug!(
            current_dir = %result.current_dir,
            entries = result.entries.len(),
            "listed directory"
        );
        Ok(result)
    }

    /// Create the folder at the full path `path`.
    ///
    /// The current directory is left unchanged.
    pub async fn create_folder(&self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        let status = self.api().add_folder(&path).await?;
        debug!(path = %path, result = %status.result, "add_folder");

        if !status.is_success() {
            return Err(SyncError::FolderCreate {
                path,
                message: status.message,
            });
        }
        Ok(())
    }

    /// Make sure every folder along `path` exists, creating missing ones.
    ///
    /// Walks from the root one segment at a time, creating a segment only if
    /// its parent's listing lacks it. Ends with `path` as the current
    /// directory. If the server reports a different directory than the one
    /// just navigated to, the mirrored state can no longer be trusted and
    /// the call fails with [`SyncError::Desync`].
    pub async fn ensure_folder_path(&self, path: &str) -> Result<NavigationResult> {
        let segments = path_segments(path);

        let root = prefix_path(&segments, 0);
        let mut nav = self.change_directory(&root).await?;
        check_position(&root, &nav)?;

        for (depth, name) in segments.iter().enumerate() {
            let target = prefix_path(&segments, depth + 1);

            if !nav.has_child_folder(name) {
                info!(path = %target, "creating missing folder");
                self.create_folder(&target).await?;
            }

            nav = self.change_directory(&target).await?;
            check_position(&target, &nav)?;
        }

        Ok(nav)
    }

    /// Remove files or folders by absolute path.
    pub async fn remove_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let status = self.api().remove_file_or_folder(paths).await?;
        debug!(paths = ?paths, result = %status.result, "remove_file_or_folder");

        if !status.is_success() {
            return Err(SyncError::Remove {
                paths: paths.to_vec(),
                message: status.message,
            });
        }
        Ok(())
    }
}

fn check_position(expected: &str, nav: &NavigationResult) -> Result<()> {
    if nav.current_dir != expected {
        return Err(SyncError::Desync {
            expected: expected.to_string(),
            actual: nav.current_dir.clone(),
        });
    }
    Ok(())
}
