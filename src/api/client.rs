//! HTTP implementation of the manager API.

use std::fmt;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ApiStatus, FolderContents, TreeListing, UploadChunk, UploadReply};
use super::ManagerApi;
use crate::error::Result;
use crate::http::HttpClient;

/// Base URL of the vendor's manager.
pub const DEFAULT_BASE_URL: &str = "https://manager.infomaniak.com";

const LOGIN_ENDPOINT: &str = "/ftp/ajax/login.php";
const API_ENDPOINT: &str = "/ftp/ajax/api.php";
const UPLOAD_ENDPOINT: &str = "/ftp/ajax/upload.php";

/// The listing endpoint pages; we always ask for everything.
const LISTING_PAGE_SIZE: u32 = 9999;

/// Chunk size the upload widget advertises in its correlation cookie.
const ADVERTISED_CHUNK_SIZE: u64 = 2_000_000;

/// Lifetime of the upload correlation cookie, in seconds.
const CHUNK_COOKIE_MAX_AGE: u64 = 5;

/// Login credentials. The password never shows up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub server: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Manager API client over HTTP.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    /// Create a new API client for the manager at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// POST an action to the API endpoint and decode the JSON answer.
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<T> {
        params.push(("action", action.to_string()));
        let body = self.http.post_form(API_ENDPOINT, &params).await?;
        debug!(action, response = %body, "api call");
        Ok(serde_json::from_str(&body)?)
    }
}

/// Name of the cookie the upload endpoint uses to match a chunk to its file.
fn chunk_cookie(chunk: &UploadChunk) -> String {
    format!(
        "qqfilechunk|{}|{}|{}={}|0; Max-Age={}",
        chunk.file_name,
        chunk.size(),
        ADVERTISED_CHUNK_SIZE,
        chunk.token,
        CHUNK_COOKIE_MAX_AGE
    )
}

/// Query string describing a one-part upload.
fn chunk_query(chunk: &UploadChunk) -> Vec<(&'static str, String)> {
    let size = chunk.size().to_string();
    vec![
        ("qqpartindex", "0".to_string()),
        ("qqpartbyteoffset", "0".to_string()),
        ("qqchunksize", size.clone()),
        ("qqtotalparts", "1".to_string()),
        ("qqtotalfilesize", size),
        ("qqfilename", chunk.file_name.clone()),
        ("qquuid", chunk.token.clone()),
        ("qqfile", chunk.file_name.clone()),
    ]
}

#[async_trait]
impl ManagerApi for ApiClient {
    async fn set_language(&self, lang: &str) -> Result<ApiStatus> {
        self.call("set_language", vec![("lang", lang.to_string())])
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<ApiStatus> {
        let params = [
            ("action", "connect".to_string()),
            ("sServer", credentials.server.clone()),
            ("sUser", credentials.username.clone()),
            ("sPwd", credentials.password.clone()),
        ];
        let body = self.http.post_form(LOGIN_ENDPOINT, &params).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn update_tree_list(&self, segments: &[String]) -> Result<TreeListing> {
        let js_path = serde_json::to_string(segments)?;
        self.call(
            "update_tree_list",
            vec![("iFrom", "0".to_string()), ("jsPath", js_path)],
        )
        .await
    }

    async fn add_folder(&self, path: &str) -> Result<ApiStatus> {
        self.call(
            "add_folder",
            vec![
                ("foldername", path.to_string()),
                ("other", "fullpath".to_string()),
            ],
        )
        .await
    }

    async fn remove_file_or_folder(&self, paths: &[String]) -> Result<ApiStatus> {
        let to_remove = serde_json::to_string(paths)?;
        self.call("remove_file_or_folder", vec![("aPathToRemove", to_remove)])
            .await
    }

    async fn load_folder_selected(&self) -> Result<FolderContents> {
        self.call(
            "loadFolderSelected",
            vec![
                ("iOffset", "0".to_string()),
                ("iCount", LISTING_PAGE_SIZE.to_string()),
                ("sSortOrder", String::new()),
                ("sSort", "none".to_string()),
                ("sSearch", String::new()),
            ],
        )
        .await
    }

    async fn upload_chunk(&self, chunk: &UploadChunk) -> Result<UploadReply> {
        self.http.set_cookie(&chunk_cookie(chunk));

        // A byte part has a known length, so the body is sent with a
        // Content-Length instead of chunked encoding, which the endpoint rejects.
        let part = Part::bytes(chunk.data.clone())
            .file_name("blob")
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("qqfile", part);

        let body = self
            .http
            .post_multipart(UPLOAD_ENDPOINT, &chunk_query(chunk), form)
            .await?;
        debug!(file = %chunk.file_name, response = %body, "upload chunk");
        Ok(serde_json::from_str(&body)?)
    }
}
