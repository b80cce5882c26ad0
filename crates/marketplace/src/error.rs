//! Request error types.
//!
//! Every failure of a profile API call is reported as a [`RequestError`].
//! The presentation layer shows [`RequestError::user_message`]; the
//! `Display` form is meant for logs.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the marketplace API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Missing, expired or rejected session token (401/403).
    #[error("Unauthorized ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// The profile no longer exists.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("Status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The page was unmounted before the response arrived.
    #[error("Request cancelled")]
    Cancelled,
}

impl RequestError {
    /// Build an error from a non-success response status and its body.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RequestError::Unauthorized {
                status: status.as_u16(),
                body,
            },
            StatusCode::NOT_FOUND => RequestError::NotFound(body),
            _ => RequestError::Status {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "Your session has expired. Please log in again.",
            RequestError::NotFound(_) => "Your account could not be found.",
            RequestError::Status { status, .. } if *status >= 500 => {
                "The server ran into a problem. Please try again later."
            }
            RequestError::Status { .. } => "The server rejected the request.",
            RequestError::Transport(_) => "Could not reach the server. Check your connection.",
            RequestError::Decode(_) => "The server sent an unexpected response.",
            RequestError::Cancelled => "The request was cancelled.",
        }
    }

    /// Whether the stored session should be considered invalid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RequestError::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RequestError::Decode(e.to_string())
        } else {
            RequestError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Decode(e.to_string())
    }
}

/// Result type alias using RequestError.
pub type RequestResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status() {
        let err = RequestError::from_status(StatusCode::UNAUTHORIZED, "bad token".into());
        assert!(err.is_unauthorized());

        let err = RequestError::from_status(StatusCode::NOT_FOUND, "gone".into());
        assert_eq!(err, RequestError::NotFound("gone".into()));

        let err = RequestError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err.to_string(), "Status 500: boom");
    }

    #[test]
    fn test_user_message_distinguishes_server_failures() {
        let server = RequestError::Status { status: 503, body: String::new() };
        let client = RequestError::Status { status: 422, body: String::new() };
        assert_ne!(server.user_message(), client.user_message());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RequestError = json_err.into();
        assert!(matches!(err, RequestError::Decode(_)));
    }
}
