//! Error types for the webftp-sync library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for webftp-sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local filesystem error.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Login was rejected by the manager.
    #[error("login failed: {0}")]
    Auth(String),

    /// The manager refused to create a folder.
    #[error("creating folder '{path}' failed: {message}")]
    FolderCreate { path: String, message: String },

    /// The manager refused to remove one or more paths.
    #[error("removing {paths:?} failed: {message}")]
    Remove { paths: Vec<String>, message: String },

    /// The server-side current directory is not where we navigated to.
    #[error("expected to be on '{expected}', but currently on '{actual}'")]
    Desync { expected: String, actual: String },

    /// Missing or malformed configuration input.
    #[error("configuration error: {0}")]
    Config(String),

    /// A local or remote path could not be used.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Auth(_) | SyncError::Desync { .. })
    }
}

/// Result type alias for webftp-sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
