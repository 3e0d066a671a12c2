use crate::prelude::*;
use introgen_core::form::GenerationRequest;
use introgen_core::result::{GenerationResult, CLIENT_FALLBACK_MESSAGE};
use std::time::Duration;

pub const GENERATE_PATH: &str = "/api/generate-intro";

/// HTTP client for the relay's generate endpoint
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(relay_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", relay_url.trim_end_matches('/'), GENERATE_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the outline to the relay.
    ///
    /// Never fails: any problem reaching the relay becomes the fallback error.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let response = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("relay request to {} failed: {}", self.endpoint, e);
                return fallback();
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => interpret_response(status, &body),
            Err(e) => {
                log::error!("failed to read relay response: {e}");
                fallback()
            }
        }
    }
}

fn fallback() -> GenerationResult {
    GenerationResult::Error(CLIENT_FALLBACK_MESSAGE.to_string())
}

/// Map a relay response onto the result shown to the user.
///
/// Only a `200` introduction and a `400` validation message are shown as
/// sent; everything else becomes the fixed fallback message.
pub fn interpret_response(status: u16, body: &[u8]) -> GenerationResult {
    let parsed = serde_json::from_slice::<GenerationResult>(body);

    match (status, parsed) {
        (200, Ok(result @ GenerationResult::Introduction(_))) => result,
        (400, Ok(result @ GenerationResult::Error(_))) => result,
        (status, Ok(GenerationResult::Error(message))) => {
            log::error!("relay returned HTTP {status}: {message}");
            fallback()
        }
        (status, Ok(GenerationResult::Introduction(_))) => {
            log::error!("relay returned an introduction with HTTP {status}");
            fallback()
        }
        (status, Err(e)) => {
            log::error!("malformed relay response (HTTP {status}): {e}");
            fallback()
        }
    }
}
