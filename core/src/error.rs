//! Error types for the Pushover client.
//!
//! # Design
//! Only two things can go wrong locally: nothing came back from the
//! network, or what came back is not a JSON object. An HTTP error status
//! with a JSON body is not an error here; it becomes a `Response` whose
//! `ok()` is false.

use thiserror::Error;

/// The request produced no response body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, reset, or the host could not be resolved.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response started arriving but could not be read.
    #[error("i/o error: {0}")]
    Io(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// A body was received but it is not a JSON object.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Valid JSON whose top level is not an object; carries the kind found.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::InvalidJson(err.to_string())
    }
}

/// Errors returned by the network-touching `Client` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ApiError::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_converts_into_api_error() {
        let err: ApiError = TransportError::Connect("refused".to_string()).into();
        assert!(err.is_transport());
        assert!(!err.is_parse());
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn serde_error_converts_into_parse_error() {
        let raw = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(ParseError::from(raw));
        assert!(err.is_parse());
        assert!(err.to_string().starts_with("invalid JSON:"));
    }

    #[test]
    fn not_an_object_names_the_kind() {
        assert_eq!(
            ParseError::NotAnObject("array").to_string(),
            "expected a JSON object, got array"
        );
    }
}
