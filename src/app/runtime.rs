//! Runtime initialization and process signals

use crate::app::{config::AppConfig, logging::init_logging};
use crate::pipeline::CancellationSignal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Initialize the application with proper logging
pub fn initialize_app(config: &AppConfig) {
    init_logging(config);
}

/// Resolve when the process receives Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl-C, shutting down");
}

/// Cancel `signal` on Ctrl-C.
///
/// Abort the returned handle once the guarded work is done.
pub fn cancel_on_ctrl_c(signal: &CancellationSignal) -> JoinHandle<()> {
    let signal = signal.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal.cancel();
    })
}
