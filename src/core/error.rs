//! Error taxonomy for quote resolution.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// Symbol is empty or too short to be a ticker. Never retried, never synthesized.
    #[error("Invalid stock symbol: '{0}'")]
    InvalidSymbol(String),

    /// One upstream vendor failed: transport error, non-OK status or a
    /// response body missing required fields. The resolver moves on to the
    /// next provider when it sees this.
    #[error("Provider error: {provider} - {message}")]
    Upstream { provider: String, message: String },

    /// Every provider failed and fallback synthesis is disabled.
    #[error("Failed to resolve quote for {symbol}: all providers failed")]
    Resolution { symbol: String },
}

impl QuoteError {
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        QuoteError::Upstream {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
