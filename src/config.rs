//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (every field is optional), then applies `POLYMAT_BIND`,
//! `POLYMAT_LOG_LEVEL` and `POLYMAT_GEMINI_BASE_URL` env overrides.
//!
//! The upstream credential is sourced from the `GEMINI_API_KEY` env var
//! only — never from TOML, so the secret cannot end up in a checked-in
//! config file. A missing key is not a startup error: requests fail with a
//! diagnosable 500 instead (the service stays up for ops to fix the env).

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the listener to.
    pub bind: String,
    /// Default log level, overridable via `RUST_LOG`.
    pub log_level: String,
}

/// Gemini provider configuration. Populated from `[gemini]` in the TOML.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL of the `generateContent` API, without the model segment.
    /// Overridable so tests can point the provider at a local mock.
    pub api_base_url: String,
    /// Model name inserted into the request path.
    pub model: String,
    /// Per-request HTTP timeout in seconds. Bounds the single outbound call
    /// so an upstream hang cannot pin a request task forever.
    pub timeout_seconds: u64,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    /// API key from `GEMINI_API_KEY` env — `None` when unset or empty.
    pub api_key: Option<String>,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    gemini: RawGemini,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawGemini {
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGemini {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}
fn default_model() -> String { "gemini-2.5-flash-preview-05-20".to_string() }
fn default_timeout_seconds() -> u64 { 30 }

// ── Env overrides ─────────────────────────────────────────────────────────────

/// Values read from the environment before resolution. Kept as a struct so
/// tests can inject overrides without mutating the process environment.
#[derive(Default)]
struct Overrides {
    bind: Option<String>,
    log_level: Option<String>,
    api_base_url: Option<String>,
}

impl Overrides {
    fn from_env() -> Self {
        Self {
            bind: env::var("POLYMAT_BIND").ok(),
            log_level: env::var("POLYMAT_LOG_LEVEL").ok(),
            api_base_url: env::var("POLYMAT_GEMINI_BASE_URL").ok(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. If no path is given and `config/default.toml` does not
/// exist, every field falls back to its hardcoded default.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();
    let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

    if let Some(path) = config_path {
        return load_from(Path::new(path), overrides, api_key);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, overrides, api_key)
    } else {
        Ok(resolve(RawConfig::default(), overrides, api_key))
    }
}

fn load_from(path: &Path, overrides: Overrides, api_key: Option<String>) -> Result<Config, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let raw: RawConfig = toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;
    Ok(resolve(raw, overrides, api_key))
}

fn resolve(raw: RawConfig, overrides: Overrides, api_key: Option<String>) -> Config {
    Config {
        server: ServerConfig {
            bind: overrides.bind.unwrap_or(raw.server.bind),
            log_level: overrides.log_level.unwrap_or(raw.server.log_level),
        },
        gemini: GeminiConfig {
            api_base_url: overrides.api_base_url.unwrap_or(raw.gemini.api_base_url),
            model: raw.gemini.model,
            timeout_seconds: raw.gemini.timeout_seconds,
        },
        api_key,
    }
}
