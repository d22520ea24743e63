use serde_json::{Map, Value};
use thiserror::Error;

/// Message used when a failure carries nothing that can be classified.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Message used when a service call succeeds but the body is neither a list nor an object.
pub const NO_VALID_RESPONSE_MESSAGE: &str = "No valid response found";

/// Message used when an authentication call succeeds but the body cannot be interpreted.
pub const PARSING_FAILURE_MESSAGE: &str = "Parsing failure!";

/// Error payload delivered to callers regardless of where the failure came from.
///
/// The payload is either the JSON object the server sent back or a map
/// synthesized locally from a status code and a reason. It is never empty.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", payload_message(.payload))]
pub struct NormalizedError {
    pub payload: Map<String, Value>,
}

impl NormalizedError {
    /// Wrap a server supplied error object. An empty object falls back to the unknown error.
    pub fn from_payload(payload: Map<String, Value>) -> Self {
        if payload.is_empty() {
            return Self::unknown();
        }
        NormalizedError { payload }
    }

    /// Synthesize `{message}` from a local reason.
    pub fn from_reason(message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_string(), Value::String(message.into()));
        NormalizedError { payload }
    }

    /// Synthesize `{code, message}` from a response code and its description.
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("code".to_string(), Value::Number(code.into()));
        payload.insert("message".to_string(), Value::String(message.into()));
        NormalizedError { payload }
    }

    /// The catch-all `{message: "Unknown error occurred"}` payload.
    pub fn unknown() -> Self {
        Self::from_reason(UNKNOWN_ERROR_MESSAGE)
    }

    /// The `message` entry of the payload, if it is a string.
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }

    /// The `code` entry of the payload, if it is an integer.
    pub fn code(&self) -> Option<i64> {
        self.payload.get("code").and_then(Value::as_i64)
    }
}

fn payload_message(payload: &Map<String, Value>) -> &str {
    payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
}

/// Main error type for provider operations
#[derive(Debug, Error)]
pub enum RestError {
    /// Normalized failure of a call
    #[error("service error: {0}")]
    Service(#[from] NormalizedError),

    /// The call was cancelled, or the provider went away before it could start
    #[error("request interrupted")]
    Interrupted,

    /// URL parsing error while configuring a provider
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl RestError {
    /// Check if this is the interruption signal rather than a failure
    pub fn is_interrupted(&self) -> bool {
        matches!(self, RestError::Interrupted)
    }

    /// Get the normalized payload if this is a service error
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            RestError::Service(err) => Some(err),
            _ => None,
        }
    }

    /// Get the status code carried in the normalized payload
    pub fn status_code(&self) -> Option<i64> {
        self.normalized().and_then(NormalizedError::code)
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_from_code() {
        let error = NormalizedError::from_code(404, "Not Found");
        assert_eq!(error.code(), Some(404));
        assert_eq!(error.message(), Some("Not Found"));
        assert_eq!(error.to_string(), "Not Found");

        let error = RestError::from(error);
        assert!(error.is_not_found());
        assert!(!error.is_interrupted());
    }

    #[test]
    fn test_empty_payload_is_never_kept() {
        let error = NormalizedError::from_payload(Map::new());
        assert_eq!(error.message(), Some(UNKNOWN_ERROR_MESSAGE));
    }

    #[test]
    fn test_server_payload_kept_verbatim() {
        let payload = json!({"name": "NotFound", "message": "missing", "code": 404});
        let Value::Object(map) = payload else { unreachable!() };
        let error = NormalizedError::from_payload(map.clone());
        assert_eq!(error.payload, map);
    }

    #[test]
    fn test_interrupted_has_no_payload() {
        let error = RestError::Interrupted;
        assert!(error.is_interrupted());
        assert!(error.normalized().is_none());
        assert_eq!(error.status_code(), None);
    }
}
