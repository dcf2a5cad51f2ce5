//! Engine client configuration.
//!
//! Configures the upstream inference endpoint. Override via environment
//! variables or explicit construction for testing.

use url::Url;

/// Configuration for connecting to the inference engine.
///
/// Custom `Debug` implementation redacts the `api_key` field to prevent
/// credential leakage in log output.
#[derive(Clone)]
pub struct EngineConfig {
    /// Streaming completions endpoint.
    pub url: Url,
    /// Bearer token for engine authentication, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Model identifier sent with each request.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ARBITER_ENGINE_URL` (required)
    /// - `ARBITER_ENGINE_API_KEY` (optional)
    /// - `ARBITER_ENGINE_MODEL` (default: `gpt-4o-mini`)
    /// - `ARBITER_ENGINE_TIMEOUT_SECS` (default: 120)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("ARBITER_ENGINE_URL").map_err(|_| ConfigError::MissingUrl)?;
        let url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("ARBITER_ENGINE_URL".to_string(), e.to_string()))?;

        Ok(Self {
            url,
            api_key: std::env::var("ARBITER_ENGINE_API_KEY").ok(),
            model: std::env::var("ARBITER_ENGINE_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: std::env::var("ARBITER_ENGINE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
        })
    }

    /// Create a configuration pointing at a local mock endpoint (for testing).
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        let url = Url::parse(&format!("http://127.0.0.1:{port}/v1/chat/completions"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            url,
            api_key: Some("test-key".to_string()),
            model: "test-model".to_string(),
            timeout_secs: 5,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ARBITER_ENGINE_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("ARBITER_ENGINE_API_KEY is not a valid header value")]
    InvalidApiKey,
}
