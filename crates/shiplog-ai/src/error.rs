//! Provider error types

use thiserror::Error;

/// Errors from a text-generation backend
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Unusable settings (unknown provider, missing model, bad request)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// No answer within the attempt timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// 5xx from the backend
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Reply could not be used
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether another attempt might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Server { .. } | Self::RateLimited { .. }
        )
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: String, retry_after: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::Authentication(message),
            429 => Self::RateLimited { retry_after },
            500..=599 => Self::Server { status, message },
            _ => Self::Configuration(format!("HTTP {}: {}", status, message)),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<shiplog_core::ConfigError> for ProviderError {
    fn from(e: shiplog_core::ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ProviderError::from_status(401, "bad key".into(), None),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, String::new(), Some(3)),
            ProviderError::RateLimited { retry_after: Some(3) }
        ));
        assert!(matches!(
            ProviderError::from_status(503, "busy".into(), None),
            ProviderError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(404, "no such model".into(), None),
            ProviderError::Configuration(_)
        ));
    }

    #[test]
    fn test_is_retryable() {
        assert!(ProviderError::Network("reset".into()).is_retryable());
        assert!(ProviderError::Timeout("60s".into()).is_retryable());
        assert!(ProviderError::from_status(502, String::new(), None).is_retryable());
        assert!(ProviderError::RateLimited { retry_after: None }.is_retryable());
        assert!(!ProviderError::Authentication("x".into()).is_retryable());
        assert!(!ProviderError::Configuration("x".into()).is_retryable());
        assert!(!ProviderError::InvalidResponse("x".into()).is_retryable());
    }
}
