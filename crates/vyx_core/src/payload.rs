use serde_json::{json, Map, Value};

use crate::CancelReason;

/// Shown when the service reports failure without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to generate content. Please try again.";

/// Typed view of a response body: success, or an application-level failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Success(Value),
    ApplicationError { message: String },
}

impl ResultPayload {
    /// Classifies a parsed body. Anything that is not an object with
    /// `success: true` and no error marker is an application error.
    pub fn from_json(body: Value) -> Self {
        let Value::Object(map) = &body else {
            return Self::ApplicationError {
                message: DEFAULT_FAILURE_MESSAGE.to_string(),
            };
        };

        let success = map.get("success").and_then(Value::as_bool) == Some(true);
        if success && !has_error_marker(map) {
            return Self::Success(body);
        }

        Self::ApplicationError {
            message: failure_message(map),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

fn has_error_marker(map: &Map<String, Value>) -> bool {
    match map.get("error") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        _ => false,
    }
}

fn failure_message(map: &Map<String, Value>) -> String {
    ["message", "error"]
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
        .to_string()
}

/// Parses a response body read as text; non-JSON text is wrapped as
/// `{"message": text}`.
pub fn parse_body_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    HttpStatus(u16),
    Network,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    pub kind: TransportFailure,
    pub message: String,
    /// Best-effort parsed response body, when one was received.
    pub body: Option<Value>,
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            TransportFailure::HttpStatus(code) => Some(code),
            TransportFailure::Network => None,
        }
    }
}

/// How one submission ended, as seen by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    Response(ResultPayload),
    Failed(TransportError),
    /// The request-level timeout expired.
    TimedOut,
    /// The cancellation token fired; carries the reason tag set with it.
    Aborted(Option<CancelReason>),
}
