use thiserror::Error;

/// Failures talking to the barangay backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Invalid response from server: {message}")]
    Decode { message: String },
    #[error("Request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
    #[error("Not authenticated - set BARANGAY_API_TOKEN or api.token")]
    Unauthenticated,
}

impl ApiError {
    /// Transient failures are retried by the next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network { .. } | ApiError::Timeout { .. } => true,
            ApiError::Http { status, .. } => *status == 429 || *status >= 500,
            ApiError::Decode { .. } | ApiError::Unauthenticated => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout { duration_ms: 0 }
        } else if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network { message: "reset".into() }.is_transient());
        assert!(ApiError::Http { status: 503, message: "unavailable".into() }.is_transient());
        assert!(ApiError::Http { status: 429, message: "slow down".into() }.is_transient());
        assert!(!ApiError::Http { status: 404, message: "missing".into() }.is_transient());
        assert!(!ApiError::Unauthenticated.is_transient());
    }
}
