//! HTTP client wrapper for web FTP manager requests.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::multipart::Form;
use reqwest::{Client, Url};

use crate::error::{Result, SyncError};

/// HTTP client for talking to the manager.
///
/// Every request of a run goes through the same cookie jar, which holds the
/// login cookie and the short-lived upload correlation cookies.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SyncError::InvalidPath(format!("{}: {}", path, e)))
    }

    /// Store a cookie for the manager's origin.
    ///
    /// `cookie` is a `Set-Cookie` style string, e.g. `name=value; Max-Age=5`.
    pub fn set_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.base_url);
    }

    /// Make a form-encoded POST request.
    ///
    /// # Returns
    /// Response body as string
    pub async fn post_form(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let url = self.endpoint(path)?;
        let response = self.client.post(url).form(params).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpError(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Make a multipart POST request with query parameters.
    pub async fn post_multipart(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> Result<String> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .query(query)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpError(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}
