//! Axum HTTP server — hosts the single proxy endpoint.
//!
//! ## URL layout
//!
//! ```text
//! POST /api/recommend   — material recommendation proxy
//! ```
//!
//! Any other verb on the route answers 405 with a JSON body, so clients get
//! a parseable error on every path. `run()` drives the axum event loop;
//! a [`CancellationToken`] is wired to axum's graceful shutdown.

mod api;

use std::sync::Arc;

use axum::{Router, routing::post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::llm::Provider;
use crate::llm::providers::gemini::GeminiProvider;

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into the handler via [`axum::extract::State`].
///
/// Cheap to clone — the provider wraps an `Arc`-backed HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub provider: Provider,
    /// Upstream credential. `None` is a running-but-misconfigured service:
    /// every request answers 500 with a diagnosable message.
    pub api_key: Option<Arc<str>>,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the router. Public so integration tests can drive it in-process.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommend", post(api::recommend))
        .method_not_allowed_fallback(api::method_not_allowed)
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind and serve until `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), AppError> {
    let gemini = GeminiProvider::new(
        config.gemini.api_base_url.clone(),
        config.gemini.model.clone(),
        config.gemini.timeout_seconds,
    )
    .map_err(|e| AppError::Server(format!("failed to build provider: {e}")))?;

    let state = AppState {
        provider: Provider::Gemini(gemini),
        api_key: config.api_key.as_deref().map(Arc::from),
    };

    let router = build_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {}: {e}", config.server.bind)))?;

    info!(bind = %config.server.bind, model = %config.gemini.model, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("server shut down");
    Ok(())
}
