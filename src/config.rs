//! Run configuration read from action-style `INPUT_*` variables.

use std::fmt;
use std::path::PathBuf;

use crate::api::{Credentials, DEFAULT_BASE_URL};
use crate::error::{Result, SyncError};
use crate::fs::normalize_path;

const FTP_SERVER: &str = "INPUT_FTPSERVER";
const FTP_USER: &str = "INPUT_FTPUSER";
const FTP_PASSWORD: &str = "INPUT_FTPPASSWORD";
const LOCAL_ROOT: &str = "INPUT_LOCALROOT";
const REMOTE_ROOT: &str = "INPUT_REMOTEROOT";
const CLEANUP_DIRS: &str = "INPUT_CLEANUPDIRS";
const BASE_URL: &str = "INPUT_BASEURL";

/// Everything one run needs.
#[derive(Clone)]
pub struct SyncConfig {
    pub base_url: String,
    pub server: String,
    pub user: String,
    pub password: String,
    pub local_root: PathBuf,
    /// Normalized; `/` when not given.
    pub remote_root: String,
    /// Normalized cleanup roots. Empty disables cleanup.
    pub cleanup_dirs: Vec<String>,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("base_url", &self.base_url)
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("local_root", &self.local_root)
            .field("remote_root", &self.remote_root)
            .field("cleanup_dirs", &self.cleanup_dirs)
            .finish()
    }
}

impl SyncConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            optional(key).ok_or_else(|| SyncError::Config(format!("{} is required", key)))
        };

        // Passwords are taken verbatim; surrounding spaces may be significant.
        let password = lookup(FTP_PASSWORD)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SyncError::Config(format!("{} is required", FTP_PASSWORD)))?;

        let cleanup_dirs = optional(CLEANUP_DIRS)
            .map(|raw| parse_dir_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            base_url: optional(BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            server: required(FTP_SERVER)?,
            user: required(FTP_USER)?,
            password,
            local_root: PathBuf::from(required(LOCAL_ROOT)?),
            remote_root: normalize_path(&optional(REMOTE_ROOT).unwrap_or_default()),
            cleanup_dirs,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            server: self.server.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

fn parse_dir_list(raw: &str) -> Vec<String> {
    raw.split(|c| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(normalize_path)
        .collect()
}
