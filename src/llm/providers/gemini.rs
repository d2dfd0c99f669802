//! Gemini `generateContent` provider.
//!
//! All Gemini wire types are private to this module — callers only see
//! [`Recommendation`] and [`ProviderError`]. The model is instructed to emit
//! its answer as a JSON string inside the first candidate's first content
//! part, so the reply is parsed twice: envelope first, then the nested text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::llm::{ProviderError, Recommendation};

/// Role prompt steering the model into a polymer materials expert and
/// pinning the exact JSON shape of the answer.
const SYSTEM_PROMPT: &str = r#"You are an expert material scientist specializing in polymers.
For a given product, identify the single most suitable plastic material and its common grade.
Then, list its key advantages and disadvantages for that specific application.
Respond ONLY with a JSON object in the following format, with no extra text or explanations. The response must be in Persian:
{
  "material": "نام ماده (فرمول شیمیایی)",
  "grade": "نام گرید رایج",
  "advantages": ["مزیت اول", "مزیت دوم", "..."],
  "disadvantages": ["عیب اول", "عیب دوم", "..."]
}"#;

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for the Gemini `generateContent` endpoint.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally. The API key is passed per call,
/// not stored here — presence is checked at the handler boundary.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Build a provider from config values.
    ///
    /// `timeout_seconds` bounds the whole request, connect included.
    pub fn new(api_base_url: String, model: String, timeout_seconds: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model })
    }

    /// One round-trip: ask the model for a material recommendation for
    /// `query` and parse the nested JSON answer.
    pub async fn recommend(&self, api_key: &str, query: &str) -> Result<Recommendation, ProviderError> {
        let url = format!(
            "{}/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model
        );
        let payload = build_payload(query);

        debug!(model = %self.model, query_len = query.len(), "sending recommendation request");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full request payload");
        }

        // Credential goes in the `key` query parameter, per the Gemini API.
        // The full URL is never logged so the key cannot leak into traces.
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(base_url = %self.api_base_url, error = %e, "upstream request failed (transport)");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            warn!(%status, %body, "upstream rejected the request");
            return Err(ProviderError::Upstream { status: status.as_u16() });
        }

        let body = response.text().await.map_err(|e| {
            error!(error = %e, "failed to read upstream reply body");
            ProviderError::Transport(e.to_string())
        })?;

        parse_reply(&body)
    }
}

/// Build the `generateContent` payload: one user turn embedding the product
/// name verbatim, the fixed system prompt, and a JSON-output directive.
fn build_payload(query: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content { parts: vec![Part { text: format!("Product: \"{query}\"") }] }],
        system_instruction: Content { parts: vec![Part { text: SYSTEM_PROMPT.to_string() }] },
        generation_config: GenerationConfig { response_mime_type: "application/json".to_string() },
    }
}

/// Parse a success body: envelope traversal down to
/// `candidates[0].content.parts[0].text`, then parse that text as JSON into a
/// [`Recommendation`]. Every missing rung is a distinct malformed-reply error.
fn parse_reply(body: &str) -> Result<Recommendation, ProviderError> {
    let envelope: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedReply(format!("invalid envelope: {e}")))?;

    let text = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedReply("no candidates in reply".into()))?
        .content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedReply("candidate has no content parts".into()))?
        .text;

    serde_json::from_str(&text)
        .map_err(|e| ProviderError::MalformedReply(format!("candidate text is not a recommendation: {e}")))
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: String,
}
