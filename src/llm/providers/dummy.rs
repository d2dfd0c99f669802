//! Dummy provider — returns a canned reply and counts invocations.
//! Used for testing the handler paths without a real API key or network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::llm::{ProviderError, Recommendation};

/// What the dummy should answer with.
#[derive(Debug, Clone)]
pub enum DummyReply {
    Recommendation(Recommendation),
    Upstream(u16),
    MalformedReply,
    Transport,
}

#[derive(Debug, Clone)]
pub struct DummyProvider {
    reply: DummyReply,
    calls: Arc<AtomicUsize>,
}

impl DummyProvider {
    pub fn new(reply: DummyReply) -> Self {
        Self { reply, calls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Number of times `recommend` was invoked, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn recommend(&self, _api_key: &str, _query: &str) -> Result<Recommendation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            DummyReply::Recommendation(rec) => Ok(rec.clone()),
            DummyReply::Upstream(status) => Err(ProviderError::Upstream { status: *status }),
            DummyReply::MalformedReply => {
                Err(ProviderError::MalformedReply("no candidates in reply".into()))
            }
            DummyReply::Transport => Err(ProviderError::Transport("connection refused".into())),
        }
    }
}
