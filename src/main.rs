//! polymat-api — proxy entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Spawn Ctrl-C → shutdown signal watcher
//!   5. Run the HTTP server until shutdown

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use polymat_api::{config, error, logger, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load(None)?;

    logger::init(&config.server.log_level)?;

    info!(
        bind = %config.server.bind,
        model = %config.gemini.model,
        timeout_seconds = config.gemini.timeout_seconds,
        api_key_present = config.api_key.is_some(),
        "config loaded"
    );

    if config.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set — all requests will answer 500 until it is");
    }

    // Shared shutdown token — Ctrl-C cancels it, the server loop watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    server::run(config, shutdown).await
}
