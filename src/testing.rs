//! In-memory manager used by the unit tests.
//!
//! Mimics the server side of the protocol: a folder tree, a current
//! directory cursor that navigation moves and uploads write into, and a log
//! of every call in the order it arrived.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use tokio::sync::Barrier;

use crate::api::types::{ContentsLine, QuotaFigures, Quotas, TreeLine};
use crate::api::{
    ApiStatus, Credentials, FolderContents, ManagerApi, TreeListing, UploadChunk, UploadReply,
};
use crate::error::{Result, SyncError};
use crate::fs::join_remote;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    SetLanguage(String),
    Login,
    UpdateTreeList(Vec<String>),
    AddFolder(String),
    Remove(Vec<String>),
    LoadFolder,
    Upload { dir: String, name: String },
}

#[derive(Default)]
struct State {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    cursor: String,
    calls: Vec<ApiCall>,
    tokens: Vec<String>,
    quota: Option<QuotaFigures>,
    login_error: Option<String>,
    language_rejected: bool,
    rejected_folders: HashMap<String, String>,
    drop_folder_creations: bool,
    removal_error: Option<String>,
    listing_fails: bool,
    rejected_uploads: HashSet<String>,
    upload_barrier: Option<Arc<Barrier>>,
}

fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl State {
    fn insert_dir(&mut self, path: &str) {
        let mut current = Some(path.to_string());
        while let Some(dir) = current {
            current = parent(&dir).map(str::to_string);
            self.dirs.insert(dir);
        }
    }

    fn child_dirs(&self, dir: &str) -> Vec<String> {
        self.dirs
            .iter()
            .filter(|d| parent(d) == Some(dir))
            .map(|d| base_name(d).to_string())
            .collect()
    }

    fn child_files(&self, dir: &str) -> Vec<String> {
        self.files
            .keys()
            .filter(|f| parent(f) == Some(dir))
            .map(|f| base_name(f).to_string())
            .collect()
    }
}

pub(crate) struct FakeManager {
    state: Mutex<State>,
}

impl FakeManager {
    pub(crate) fn new() -> Self {
        let mut state = State {
            cursor: "/".to_string(),
            ..State::default()
        };
        state.dirs.insert("/".to_string());
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub(crate) fn add_dir(&self, path: &str) {
        self.state().insert_dir(path);
    }

    pub(crate) fn add_file(&self, path: &str, data: &[u8]) {
        let mut state = self.state();
        if let Some(dir) = parent(path) {
            state.insert_dir(dir);
        }
        state.files.insert(path.to_string(), data.to_vec());
    }

    pub(crate) fn set_quota(&self, percent: f64, percent_free: f64, used: &str, total: &str) {
        self.state().quota = Some(QuotaFigures {
            percent,
            percent_free,
            used: used.to_string(),
            total: total.to_string(),
        });
    }

    pub(crate) fn reject_login(&self, message: &str) {
        self.state().login_error = Some(message.to_string());
    }

    pub(crate) fn reject_language(&self) {
        self.state().language_rejected = true;
    }

    pub(crate) fn reject_folder(&self, path: &str, message: &str) {
        self.state()
            .rejected_folders
            .insert(path.to_string(), message.to_string());
    }

    /// Answer folder creations with success without creating anything.
    pub(crate) fn drop_folder_creations(&self) {
        self.state().drop_folder_creations = true;
    }

    pub(crate) fn reject_removals(&self, message: &str) {
        self.state().removal_error = Some(message.to_string());
    }

    pub(crate) fn fail_listing(&self) {
        self.state().listing_fails = true;
    }

    pub(crate) fn reject_upload(&self, file_name: &str) {
        self.state().rejected_uploads.insert(file_name.to_string());
    }

    /// Hold every upload until `in_flight` of them are pending at once.
    pub(crate) fn hold_uploads_until(&self, in_flight: usize) {
        self.state().upload_barrier = Some(Arc::new(Barrier::new(in_flight)));
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub(crate) fn folder_creations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::AddFolder(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn upload_tokens(&self) -> Vec<String> {
        self.state().tokens.clone()
    }

    pub(crate) fn has_dir(&self, path: &str) -> bool {
        self.state().dirs.contains(path)
    }

    /// Read a stored file back, independently of the protocol.
    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }
}

#[async_trait]
impl ManagerApi for FakeManager {
    async fn set_language(&self, lang: &str) -> Result<ApiStatus> {
        let mut state = self.state();
        state.calls.push(ApiCall::SetLanguage(lang.to_string()));
        if state.language_rejected {
            return Ok(ApiStatus::error("Unknown language"));
        }
        Ok(ApiStatus::success())
    }

    async fn login(&self, _credentials: &Credentials) -> Result<ApiStatus> {
        let mut state = self.state();
        state.calls.push(ApiCall::Login);
        match &state.login_error {
            Some(message) => Ok(ApiStatus::error(message.clone())),
            None => Ok(ApiStatus::success()),
        }
    }

    async fn update_tree_list(&self, segments: &[String]) -> Result<TreeListing> {
        let mut state = self.state();
        state.calls.push(ApiCall::UpdateTreeList(segments.to_vec()));

        // Unknown folders leave the cursor on the deepest existing ancestor.
        let mut cursor = "/".to_string();
        for segment in segments {
            let next = join_remote(&cursor, segment);
            if !state.dirs.contains(&next) {
                break;
            }
            cursor = next;
        }
        state.cursor = cursor.clone();

        let quotas = if cursor == "/" {
            state.quota.clone().map(|site| Quotas {
                site: Some(site),
                user: None,
            })
        } else {
            None
        };
        let lines = state
            .child_dirs(&cursor)
            .into_iter()
            .map(|name| TreeLine { name })
            .collect();

        Ok(TreeListing {
            path: cursor,
            lines: Some(lines),
            quotas,
        })
    }

    async fn add_folder(&self, path: &str) -> Result<ApiStatus> {
        let mut state = self.state();
        state.calls.push(ApiCall::AddFolder(path.to_string()));

        if let Some(message) = state.rejected_folders.get(path) {
            return Ok(ApiStatus::error(message.clone()));
        }
        if state.drop_folder_creations {
            return Ok(ApiStatus::success());
        }
        match parent(path) {
            Some(dir) if state.dirs.contains(dir) => {
                state.dirs.insert(path.to_string());
                Ok(ApiStatus::success())
            }
            _ => Ok(ApiStatus::error("Parent folder does not exist")),
        }
    }

    async fn remove_file_or_folder(&self, paths: &[String]) -> Result<ApiStatus> {
        let mut state = self.state();
        state.calls.push(ApiCall::Remove(paths.to_vec()));

        if let Some(message) = &state.removal_error {
            return Ok(ApiStatus::error(message.clone()));
        }
        for path in paths {
            let prefix = format!("{}/", path);
            state.files.retain(|f, _| f != path && !f.starts_with(&prefix));
            state.dirs.retain(|d| d != path && !d.starts_with(&prefix));
        }
        Ok(ApiStatus::success())
    }

    async fn load_folder_selected(&self) -> Result<FolderContents> {
        let mut state = self.state();
        state.calls.push(ApiCall::LoadFolder);

        if state.listing_fails {
            return Err(SyncError::HttpError(500));
        }
        let cursor = state.cursor.clone();
        let folders = state.child_dirs(&cursor).into_iter().map(|name| ContentsLine {
            name: Some(name),
            kind: "folder".to_string(),
        });
        let files = state.child_files(&cursor).into_iter().map(|name| ContentsLine {
            name: Some(name),
            kind: "file".to_string(),
        });
        let lines: Vec<_> = folders.chain(files).collect();

        Ok(FolderContents {
            number_of_rows: Some(lines.len() as u64),
            lines: Some(lines),
        })
    }

    async fn upload_chunk(&self, chunk: &UploadChunk) -> Result<UploadReply> {
        let barrier = self.state().upload_barrier.clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        let mut state = self.state();
        let dir = state.cursor.clone();
        state.calls.push(ApiCall::Upload {
            dir: dir.clone(),
            name: chunk.file_name.clone(),
        });
        state.tokens.push(chunk.token.clone());

        if state.rejected_uploads.contains(&chunk.file_name) {
            return Ok(UploadReply {
                success: false,
                message: "Upload rejected".to_string(),
            });
        }
        state
            .files
            .insert(join_remote(&dir, &chunk.file_name), chunk.data.clone());
        Ok(UploadReply {
            success: true,
            message: String::new(),
        })
    }
}
