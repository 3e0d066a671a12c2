use super::UpstreamConfig;
use crate::prelude::*;
use introgen_core::gemini::{extract_text, GenerateContentRequest, GenerateContentResponse};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

/// Longest slice of an upstream error body kept in the error value.
const MAX_LOGGED_BODY: usize = 2048;

/// HTTP client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| eyre!("Invalid API key header value: {}", e))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base.trim_end_matches('/'),
                config.model
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `prompt` as a single user turn and return the generated text.
    ///
    /// Makes exactly one request; failures are never retried.
    pub async fn generate(&self, prompt: &str) -> std::result::Result<String, Error> {
        let payload = GenerateContentRequest::single_turn(prompt);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::UpstreamTransport(describe_reqwest_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body: truncate(&body, MAX_LOGGED_BODY),
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamFormat(format!("Failed to parse response: {e}")))?;

        Ok(extract_text(&envelope)?.to_string())
    }
}

fn describe_reqwest_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
