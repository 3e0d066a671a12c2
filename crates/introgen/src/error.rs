use introgen_core::form::{describe_fields, Field};
use introgen_core::gemini::EnvelopeError;

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Missing required fields: {}", describe_fields(.0))]
    Validation(Vec<Field>),

    #[error("Upstream request failed: {0}")]
    UpstreamTransport(String),

    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Unexpected upstream response: {0}")]
    UpstreamFormat(String),
}

impl From<EnvelopeError> for Error {
    fn from(err: EnvelopeError) -> Self {
        Error::UpstreamFormat(err.to_string())
    }
}

impl Error {
    /// Whether the caller, rather than the upstream API, caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
