//! Upload operations.

use std::path::Path;

use tracing::debug;
use uuid::Uuid;

use super::events::SessionEvent;
use super::Session;
use crate::api::UploadChunk;
use crate::error::{Result, SyncError};
use crate::fs::{join_remote, UploadOutcome};

impl Session {
    /// Upload a local file into the current directory.
    ///
    /// The whole file goes out as the single chunk of a one-part upload;
    /// there is no resume. The outcome records the current directory as it
    /// was when the call was made, which must not change while uploads are
    /// in flight.
    ///
    /// # Arguments
    /// * `local_path` - Path to the local file to upload
    pub async fn upload<P: AsRef<Path>>(&self, local_path: P) -> Result<UploadOutcome> {
        let path = local_path.as_ref();
        let current_dir = self.current_dir();

        let file_name = path
            .file_name()
            .ok_or_else(|| SyncError::InvalidPath(format!("no file name in '{}'", path.display())))?
            .to_string_lossy()
            .into_owned();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| SyncError::io(path, e))?;
        if !metadata.is_file() {
            return Err(SyncError::InvalidPath(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| SyncError::io(path, e))?;

        let chunk = UploadChunk {
            file_name,
            data,
            token: Uuid::new_v4().to_string(),
        };
        debug!(
            local = %path.display(),
            size = metadata.len(),
            token = %chunk.token,
            "uploading file"
        );

        let reply = self.api().upload_chunk(&chunk).await?;
        if !reply.success && !reply.message.is_empty() {
            debug!(local = %path.display(), message = %reply.message, "upload rejected");
        }

        let outcome = UploadOutcome {
            succeeded: reply.success,
            remote_path: join_remote(&current_dir, &chunk.file_name),
            current_dir,
            file_name: chunk.file_name,
            local_path: path.display().to_string(),
        };

        self.notify(SessionEvent::Upload {
            local_path: path,
            outcome: &outcome,
        })
        .await;

        Ok(outcome)
    }
}
