use serde::{Deserialize, Serialize};

/// Message returned by the relay when a required field is blank.
pub const VALIDATION_MESSAGE: &str = "Please fill in all fields.";

/// Message returned by the relay when the body is not a JSON outline.
pub const INVALID_BODY_MESSAGE: &str =
    "The request body must be a JSON object with the five outline fields.";

/// Generic message returned by the relay for every upstream failure.
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "An error occurred on the server or in the Gemini API.";

/// Message the form client shows when it cannot get a usable relay response.
pub const CLIENT_FALLBACK_MESSAGE: &str = "An error occurred while connecting to the server.\n\
Check that the backend server is running and inspect the client log (RUST_LOG=debug).";

/// Outcome of one generation, as exchanged between relay and client.
///
/// Serializes as `{"introduction": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationResult {
    Introduction(String),
    Error(String),
}

impl GenerationResult {
    pub fn introduction(&self) -> Option<&str> {
        match self {
            GenerationResult::Introduction(text) => Some(text),
            GenerationResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationResult::Introduction(_) => None,
            GenerationResult::Error(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, GenerationResult::Error(_))
    }
}
