use serde::{Deserialize, Deserializer, Serialize};

/// One of the five outline fields a user fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MainTopic,
    SpecificProblem,
    OldMethods,
    Solution,
    Benefits,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 5] = [
        Field::MainTopic,
        Field::SpecificProblem,
        Field::OldMethods,
        Field::Solution,
        Field::Benefits,
    ];

    /// JSON key and template placeholder name.
    pub fn key(self) -> &'static str {
        match self {
            Field::MainTopic => "main_topic",
            Field::SpecificProblem => "specific_problem",
            Field::OldMethods => "old_methods",
            Field::Solution => "solution",
            Field::Benefits => "benefits",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::MainTopic => "Main topic",
            Field::SpecificProblem => "Specific problem",
            Field::OldMethods => "Limitations of prior methods",
            Field::Solution => "Proposed solution",
            Field::Benefits => "Key benefits",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Field::MainTopic => {
                "e.g. Generating 4D video from a single image for robot spatial perception."
            }
            Field::SpecificProblem => "The pain point: scarce data, high training cost, etc.",
            Field::OldMethods => "e.g. requires multi-view input, slow optimization, poor generalization...",
            Field::Solution => "Briefly describe the method or model you propose.",
            Field::Benefits => "Speed, accuracy, generality, cost, impact...",
        }
    }

    /// Look up a field by its JSON key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Fields the relay requires before it calls the upstream API.
pub const RELAY_REQUIRED: [Field; 5] = Field::ALL;

/// Fields the form client requires before it submits.
///
/// `old_methods` is deliberately absent: the client lets the relay reject it.
pub const CLIENT_REQUIRED: [Field; 4] = [
    Field::MainTopic,
    Field::SpecificProblem,
    Field::Solution,
    Field::Benefits,
];

/// The outline a user submits to generate an introduction.
///
/// Missing or `null` JSON fields deserialize as empty strings so they are
/// rejected by validation rather than by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub main_topic: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub specific_problem: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub old_methods: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub solution: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub benefits: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl GenerationRequest {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::MainTopic => &self.main_topic,
            Field::SpecificProblem => &self.specific_problem,
            Field::OldMethods => &self.old_methods,
            Field::Solution => &self.solution,
            Field::Benefits => &self.benefits,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::MainTopic => &mut self.main_topic,
            Field::SpecificProblem => &mut self.specific_problem,
            Field::OldMethods => &mut self.old_methods,
            Field::Solution => &mut self.solution,
            Field::Benefits => &mut self.benefits,
        };
        *slot = value.into();
    }

    /// Return the fields from `required` that are empty, in form order.
    ///
    /// Whitespace is content: only a zero-length value is missing.
    pub fn missing_fields(&self, required: &[Field]) -> Vec<Field> {
        required
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    /// Validation applied at the relay boundary: every field must be filled.
    pub fn validate_for_relay(&self) -> Result<(), Vec<Field>> {
        as_result(self.missing_fields(&RELAY_REQUIRED))
    }

    /// Validation applied by the form client before submitting.
    pub fn validate_for_client(&self) -> Result<(), Vec<Field>> {
        as_result(self.missing_fields(&CLIENT_REQUIRED))
    }
}

fn as_result(missing: Vec<Field>) -> Result<(), Vec<Field>> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

/// Join field labels for a user-facing notice, e.g. "Main topic, Key benefits".
pub fn describe_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}
