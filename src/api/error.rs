use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid or expired API key")]
    InvalidKey,

    #[error("Torn API error {code}: {message}")]
    Torn { code: i64, message: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Torn reports failures as HTTP 200 with an `error` object in the body;
/// FFScouter uses the same shape.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: UpstreamError,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub error: String,
}

// Torn API error codes that mean the key itself is bad.
// 1: key empty, 2: incorrect key, 13: key disabled due to inactivity,
// 16: access level too low.
const KEY_ERROR_CODES: [i64; 4] = [1, 2, 13, 16];

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 | 403 => ApiError::InvalidKey,
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Map an in-body error object to an `ApiError`.
    pub fn from_envelope(err: UpstreamError) -> Self {
        if KEY_ERROR_CODES.contains(&err.code) {
            ApiError::InvalidKey
        } else if err.code == 5 {
            // Code 5: too many requests
            ApiError::RateLimited
        } else {
            ApiError::Torn { code: err.code, message: err.error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            ApiError::InvalidKey
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, "oops"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_from_envelope_key_errors() {
        let err = UpstreamError { code: 2, error: "Incorrect key".to_string() };
        assert!(matches!(ApiError::from_envelope(err), ApiError::InvalidKey));

        let rate = UpstreamError { code: 5, error: "Too many requests".to_string() };
        assert!(matches!(ApiError::from_envelope(rate), ApiError::RateLimited));

        let other = UpstreamError { code: 9, error: "API disabled".to_string() };
        assert!(matches!(ApiError::from_envelope(other), ApiError::Torn { code: 9, .. }));
    }

    #[test]
    fn test_envelope_parses() {
        let body = r#"{"error":{"code":2,"error":"Incorrect key"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.code, 2);
        assert_eq!(envelope.error.error, "Incorrect key");
    }
}
