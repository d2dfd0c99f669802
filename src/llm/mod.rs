//! LLM provider abstraction.
//!
//! `Provider` is an enum over concrete backends — enum dispatch avoids
//! `dyn` trait objects and the `async-trait` dependency. Adding a backend =
//! new module in `providers/` + new variant + new `recommend` arm.
//!
//! Provider instances are shared immutable capabilities — clone them freely.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

/// Per-request failure of the outbound inference call.
///
/// Each variant maps to exactly one client-visible outcome (see
/// `server::api`): `Upstream` mirrors the upstream status, the other two
/// collapse to a generic 500.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure: connect error, timeout, broken transfer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The upstream service answered with a non-success HTTP status.
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16 },

    /// The success envelope lacked the expected structure, or the nested
    /// text-as-JSON failed to parse into a [`Recommendation`].
    #[error("malformed upstream reply: {0}")]
    MalformedReply(String),
}

// ── Response entity ───────────────────────────────────────────────────────────

/// Structured answer returned to the client.
///
/// Parsed from the *nested* JSON text the model is instructed to emit. All
/// four fields are required — a reply missing any of them is rejected as
/// malformed rather than forwarded with holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub material: String,
    pub grade: String,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum Provider {
    Gemini(providers::gemini::GeminiProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl Provider {
    /// One round-trip: send `query` to the backend and return the parsed
    /// recommendation. `api_key` authorises the call; validating its
    /// presence is the caller's job.
    pub async fn recommend(&self, api_key: &str, query: &str) -> Result<Recommendation, ProviderError> {
        match self {
            Provider::Gemini(p) => p.recommend(api_key, query).await,
            Provider::Dummy(p) => p.recommend(api_key, query).await,
        }
    }
}
