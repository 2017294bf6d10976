//! Web FTP manager API client and types.
//!
//! Every protocol action has its own typed method on [`ManagerApi`]. The
//! [`Session`](crate::session::Session) is written against this trait, so the
//! HTTP implementation ([`ApiClient`]) can be replaced by an in-memory server
//! in tests.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::{ApiClient, Credentials, DEFAULT_BASE_URL};
pub use types::{ApiStatus, FolderContents, TreeListing, UploadChunk, UploadReply};

/// Typed surface of the manager's stateful protocol.
///
/// Navigation, listing and uploads act on the server-side current
/// directory; folder creation and removal take full paths.
#[async_trait]
pub trait ManagerApi: Send + Sync {
    /// Select the language of server messages.
    async fn set_language(&self, lang: &str) -> Result<ApiStatus>;

    /// Open the authenticated session.
    async fn login(&self, credentials: &Credentials) -> Result<ApiStatus>;

    /// Navigate to the directory made of `segments` (empty = root).
    async fn update_tree_list(&self, segments: &[String]) -> Result<TreeListing>;

    /// Create the folder at the full path `path`.
    async fn add_folder(&self, path: &str) -> Result<ApiStatus>;

    /// Remove files or folders by absolute path.
    async fn remove_file_or_folder(&self, paths: &[String]) -> Result<ApiStatus>;

    /// List the contents of the current directory.
    async fn load_folder_selected(&self) -> Result<FolderContents>;

    /// Upload one file, as a single chunk, into the current directory.
    async fn upload_chunk(&self, chunk: &UploadChunk) -> Result<UploadReply>;
}
