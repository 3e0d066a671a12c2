//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Only the subset of the envelope the relay reads or writes is modelled;
//! every response field is optional so that an unexpected shape surfaces as
//! an [`EnvelopeError`] instead of a decode failure.

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single-turn request carrying `prompt` as one user message.
    pub fn single_turn(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Response envelope from `generateContent`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One candidate completion
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Reasons the generated text could not be located in a response envelope.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("response has no candidates (block reason: {})", .block_reason.as_deref().unwrap_or("none"))]
    NoCandidates { block_reason: Option<String> },

    #[error("first candidate has no text part (finish reason: {})", .finish_reason.as_deref().unwrap_or("none"))]
    NoText { finish_reason: Option<String> },
}

/// Extract the generated text of the first part of the first candidate.
///
/// An empty string is treated as absent.
pub fn extract_text(response: &GenerateContentResponse) -> Result<&str, EnvelopeError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| EnvelopeError::NoCandidates {
            block_reason: response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.clone()),
        })?;

    candidate
        .content
        .as_ref()
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.as_deref())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| EnvelopeError::NoText {
            finish_reason: candidate.finish_reason.clone(),
        })
}
