//! Error types for codex.

use thiserror::Error;

/// Primary error type for all codex operations.
#[derive(Error, Debug)]
pub enum CodexError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A transport failure that survived every retry attempt.
    #[error("Transport error after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: Box<CodexError>,
    },
}

impl CodexError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error came from opening or reading a provider stream.
    ///
    /// Everything except configuration and caller mistakes counts, including
    /// API status errors: the agent loop retries any failure on the wire.
    pub fn is_transport(&self) -> bool {
        !matches!(
            self,
            Self::Configuration(_) | Self::InvalidArgument(_) | Self::Transport { .. }
        )
    }

    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_transport()
    }

    /// Wrap an exhausted transport failure.
    pub fn transport(attempts: u32, source: CodexError) -> Self {
        Self::Transport {
            attempts,
            source: Box::new(source),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CodexError>;
