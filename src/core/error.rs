//! Error taxonomy for series retrieval.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// Transport failure or non-success status from every applicable provider.
    #[error("{provider} unavailable: {reason}")]
    UpstreamUnavailable { provider: String, reason: String },

    /// No provider mapping exists for the requested key.
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// The response body did not match the expected schema.
    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },
}

impl SeriesError {
    pub fn unavailable(provider: &str, reason: impl Into<String>) -> Self {
        SeriesError::UpstreamUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        SeriesError::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

pub type SeriesResult<T> = std::result::Result<T, SeriesError>;
