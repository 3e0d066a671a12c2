use crate::form::{Field, GenerationRequest};
use crate::result::GenerationResult;

/// What the result area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView<'a> {
    /// A generation is outstanding.
    Loading,
    /// Nothing generated yet.
    Empty,
    Introduction(&'a str),
    Error(&'a str),
}

/// Why a submission could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    /// A generation is already outstanding.
    InFlight,
    /// Regenerate was requested before any result existed.
    NoResultYet,
    /// Client-side validation failed for these fields.
    Missing(Vec<Field>),
}

/// In-memory state of the form client.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    fields: GenerationRequest,
    in_flight: bool,
    result: Option<GenerationResult>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: GenerationRequest) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn fields(&self) -> &GenerationRequest {
        &self.fields
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn can_generate(&self) -> bool {
        !self.in_flight
    }

    pub fn can_regenerate(&self) -> bool {
        !self.in_flight && self.result.is_some()
    }

    pub fn can_copy(&self) -> bool {
        self.copy_text().is_some()
    }

    /// Text the Copy action places on the clipboard, if any.
    pub fn copy_text(&self) -> Option<&str> {
        if self.in_flight {
            return None;
        }
        self.result
            .as_ref()
            .and_then(GenerationResult::introduction)
    }

    /// Start a generation from the current field values.
    ///
    /// On success the session is in flight, the previous result is cleared
    /// and the request to send is returned.
    pub fn begin_submit(&mut self) -> Result<GenerationRequest, SubmitRejected> {
        if self.in_flight {
            return Err(SubmitRejected::InFlight);
        }
        self.fields
            .validate_for_client()
            .map_err(SubmitRejected::Missing)?;

        self.in_flight = true;
        self.result = None;
        Ok(self.fields.clone())
    }

    /// Like [`FormSession::begin_submit`], but only once a result exists.
    pub fn begin_regenerate(&mut self) -> Result<GenerationRequest, SubmitRejected> {
        if self.in_flight {
            return Err(SubmitRejected::InFlight);
        }
        if self.result.is_none() {
            return Err(SubmitRejected::NoResultYet);
        }
        self.begin_submit()
    }

    /// Record the outcome of the outstanding generation.
    pub fn complete(&mut self, outcome: GenerationResult) {
        self.in_flight = false;
        self.result = Some(outcome);
    }

    pub fn view(&self) -> ResultView<'_> {
        if self.in_flight {
            return ResultView::Loading;
        }
        match &self.result {
            None => ResultView::Empty,
            Some(GenerationResult::Introduction(text)) => ResultView::Introduction(text),
            Some(GenerationResult::Error(message)) => ResultView::Error(message),
        }
    }
}
