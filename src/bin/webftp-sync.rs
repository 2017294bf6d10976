//! Mirror a local directory onto a web-FTP manager.
//!
//! Configured entirely through `INPUT_*` environment variables; see
//! [`webftp_sync::config::SyncConfig`].

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use webftp_sync::{runner, SyncConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("webftp_sync=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match runner::run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("synchronization failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
