//! One complete run: connect, mirror, clean up.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, ManagerApi};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::session::Session;
use crate::sync::{CleanupReport, DirectoryReport, StaleFileTracker, Synchronizer};

/// What a run did.
#[derive(Debug)]
pub struct RunSummary {
    pub sync: DirectoryReport,
    /// `None` when no cleanup roots were configured.
    pub cleanup: Option<CleanupReport>,
}

impl RunSummary {
    /// True if nothing failed anywhere, cleanup included.
    pub fn is_clean(&self) -> bool {
        self.sync.is_clean()
            && self
                .cleanup
                .as_ref()
                .map_or(true, |c| c.failures().is_empty())
    }
}

/// Run against the manager over HTTP.
pub async fn run(config: &SyncConfig) -> Result<RunSummary> {
    let api = ApiClient::new(&config.base_url)?;
    run_with_api(config, Arc::new(api)).await
}

/// Run against any [`ManagerApi`] implementation.
pub async fn run_with_api(config: &SyncConfig, api: Arc<dyn ManagerApi>) -> Result<RunSummary> {
    info!(
        server = %config.server,
        user = %config.user,
        local = %config.local_root.display(),
        remote = %config.remote_root,
        "starting synchronization"
    );

    let session = Session::new(api, config.credentials());
    let tracker = if config.cleanup_dirs.is_empty() {
        None
    } else {
        Some(StaleFileTracker::attach(&config.cleanup_dirs, &session))
    };

    let sync = Synchronizer::new(&session)
        .upload(&config.local_root, &config.remote_root)
        .await?;

    let cleanup = match tracker {
        Some(tracker) => Some(tracker.cleanup(&session).await),
        None => None,
    };

    let summary = RunSummary { sync, cleanup };
    if summary.is_clean() {
        info!("run completed");
    } else {
        warn!("run completed with errors");
    }
    Ok(summary)
}
