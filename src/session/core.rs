//! Session state and authentication.
//!
//! This module holds the one piece of mutable protocol state, the mirrored
//! current directory, and handles login.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::events::{EventHandler, EventKind, SessionEvent, Subscribers};
use crate::api::{ApiClient, Credentials, ManagerApi};
use crate::error::{Result, SyncError};

/// Language requested so server messages are in English.
const LANGUAGE: &str = "en_GB";

/// Authenticated connection to the manager.
///
/// The server keeps a "current directory" cursor per session. The mirrored
/// value is authoritative only right after a successful change-directory
/// call; listing and upload act relative to it. A session belongs to a
/// single run.
pub struct Session {
    api: Arc<dyn ManagerApi>,
    credentials: Credentials,
    /// Mirrored server-side current directory
    current_dir: Mutex<String>,
    pub(crate) subscribers: Subscribers,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("current_dir", &self.current_dir())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Session {
    /// Create a session over any implementation of the protocol.
    pub fn new(api: Arc<dyn ManagerApi>, credentials: Credentials) -> Self {
        Self {
            api,
            credentials,
            current_dir: Mutex::new("/".to_string()),
            subscribers: Subscribers::default(),
        }
    }

    /// Create a session talking HTTP to the manager at `base_url`.
    pub fn with_http(base_url: &str, credentials: Credentials) -> Result<Self> {
        let api = ApiClient::new(base_url)?;
        Ok(Self::new(Arc::new(api), credentials))
    }

    pub(crate) fn api(&self) -> &dyn ManagerApi {
        self.api.as_ref()
    }

    /// Directory the server considers current, as last reported.
    pub fn current_dir(&self) -> String {
        self.current_dir.lock().clone()
    }

    pub(crate) fn set_current_dir(&self, dir: &str) {
        *self.current_dir.lock() = dir.to_string();
    }

    /// Establish the session and log in.
    ///
    /// Selecting the message language is best-effort; a rejected login is
    /// fatal.
    pub async fn connect(&self) -> Result<()> {
        match self.api.set_language(LANGUAGE).await {
            Ok(status) if status.is_success() => debug!(lang = LANGUAGE, "language selected"),
            Ok(status) => warn!(message = %status.message, "set_language failed"),
            Err(e) => warn!(error = %e, "set_language failed"),
        }

        let status = self.api.login(&self.credentials).await?;
        if !status.is_success() {
            error!(
                server = %self.credentials.server,
                user = %self.credentials.username,
                message = %status.message,
                "login failed"
            );
            return Err(SyncError::Auth(status.message));
        }

        info!(
            server = %self.credentials.server,
            user = %self.credentials.username,
            "logged in"
        );
        Ok(())
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.subscribers.add(kind, handler);
    }

    /// Await every handler for the event, logging failures.
    pub(crate) async fn notify(&self, event: SessionEvent<'_>) {
        for handler in self.subscribers.for_kind(event.kind()) {
            if let Err(e) = handler.handle(self, &event).await {
                warn!(kind = ?event.kind(), error = %e, "event handler failed");
            }
        }
    }
}
