use super::RelayState;
use crate::prelude::*;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use introgen_core::form::GenerationRequest;
use introgen_core::prompt::render_prompt;
use introgen_core::result::{
    GenerationResult, INVALID_BODY_MESSAGE, UPSTREAM_FAILURE_MESSAGE, VALIDATION_MESSAGE,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: Arc<RelayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/generate-intro", post(generate_intro))
        .layer(cors)
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Upstream detail stays in the server log; callers get a fixed message.
        let (status, message) = if self.is_client_error() {
            (StatusCode::BAD_REQUEST, VALIDATION_MESSAGE)
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILURE_MESSAGE)
        };
        (status, Json(GenerationResult::Error(message.to_string()))).into_response()
    }
}

async fn generate_intro(
    State(state): State<Arc<RelayState>>,
    payload: std::result::Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    log::info!("received introduction request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::warn!("rejected request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(GenerationResult::Error(INVALID_BODY_MESSAGE.to_string())),
            )
                .into_response();
        }
    };

    match generate_introduction(&state, &request).await {
        Ok(introduction) => {
            log::info!("sending introduction ({} chars)", introduction.len());
            (
                StatusCode::OK,
                Json(GenerationResult::Introduction(introduction)),
            )
                .into_response()
        }
        Err(err) => {
            if err.is_client_error() {
                log::warn!("{err}");
            } else {
                log::error!("generation failed: {err}");
            }
            err.into_response()
        }
    }
}

/// Validate, render the prompt and make the single upstream call.
pub async fn generate_introduction(
    state: &RelayState,
    request: &GenerationRequest,
) -> std::result::Result<String, Error> {
    request.validate_for_relay().map_err(Error::Validation)?;

    let prompt = render_prompt(&state.template, request);
    log::debug!("prompt rendered ({} chars)", prompt.len());

    state.upstream.generate(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::UpstreamConfig;
    use axum::body::Bytes;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned upstream reply: status plus raw body.
    #[derive(Clone)]
    struct Reply {
        status: StatusCode,
        body: String,
    }

    #[derive(Default)]
    struct StubLog {
        calls: AtomicUsize,
        last_body: Mutex<Option<Value>>,
        last_key: Mutex<Option<String>>,
    }

    struct StubUpstream {
        base: String,
        log: Arc<StubLog>,
    }

    impl StubUpstream {
        fn calls(&self) -> usize {
            self.log.calls.load(Ordering::SeqCst)
        }
    }

    async fn spawn_upstream(reply: Reply) -> StubUpstream {
        spawn_slow_upstream(reply, Duration::ZERO).await
    }

    /// Stub upstream that waits `delay` before answering.
    async fn spawn_slow_upstream(reply: Reply, delay: Duration) -> StubUpstream {
        let log = Arc::new(StubLog::default());
        let handler_log = log.clone();

        let app = Router::new().route(
            "/models/{action}",
            post(move |headers: axum::http::HeaderMap, body: Bytes| {
                let log = handler_log.clone();
                let reply = reply.clone();
                async move {
                    log.calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    *log.last_body.lock().unwrap() = serde_json::from_slice(&body).ok();
                    *log.last_key.lock().unwrap() = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    (reply.status, reply.body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubUpstream {
            base: format!("http://{addr}"),
            log,
        }
    }

    async fn spawn_relay(upstream: &StubUpstream, template: &str) -> String {
        spawn_relay_with_timeout(upstream, template, Duration::from_secs(5)).await
    }

    async fn spawn_relay_with_timeout(
        upstream: &StubUpstream,
        template: &str,
        timeout: Duration,
    ) -> String {
        let config = UpstreamConfig {
            api_base: upstream.base.clone(),
            model: "gemini-2.5-flash".to_string(),
            api_key: "stub-key".to_string(),
            timeout,
        };
        let state = Arc::new(RelayState::new(config, template.to_string()).unwrap());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        format!("http://{addr}/api/generate-intro")
    }

    fn success_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    fn full_request() -> Value {
        json!({
            "main_topic": "Robot spatial perception",
            "specific_problem": "Scarce 4D data",
            "old_methods": "Multi-view capture",
            "solution": "Single-image 4D generation",
            "benefits": "Cheap and general"
        })
    }

    async fn send(url: &str, body: &Value) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(url)
            .json(body)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_success_returns_extracted_text_unchanged() {
        let text = "Robots need 4D understanding [ref].\n\nHowever, data is scarce. ✨";
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: success_body(text),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}|{old_methods}").await;

        let (status, body) = send(&url, &full_request()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "introduction": text }));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_receives_single_user_turn_and_key_header() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: success_body("ok"),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}|{old_methods}").await;

        send(&url, &full_request()).await;

        let sent = upstream.log.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(
            sent,
            json!({"contents": [{
                "role": "user",
                "parts": [{"text": "Robot spatial perception|Multi-view capture"}]
            }]})
        );
        assert_eq!(
            upstream.log.last_key.lock().unwrap().as_deref(),
            Some("stub-key")
        );
    }

    #[tokio::test]
    async fn test_missing_field_is_400_without_upstream_call() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: success_body("unused"),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let mut request = full_request();
        request["old_methods"] = json!("");
        let (status, body) = send(&url, &request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": VALIDATION_MESSAGE }));

        let (status, _) = send(&url, &json!({"main_topic": "only"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_with_error_body() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: success_body("unused"),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let response = reqwest::Client::new()
            .post(&url)
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": INVALID_BODY_MESSAGE }));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_generic_500() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::FORBIDDEN,
            body: json!({"error": {"message": "API key leaked-secret-detail invalid"}}).to_string(),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let (status, body) = send(&url, &full_request()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": UPSTREAM_FAILURE_MESSAGE }));
        assert!(!body.to_string().contains("leaked-secret-detail"));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_envelope_without_text_is_500() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: json!({"candidates": [{"finishReason": "SAFETY"}]}).to_string(),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let (status, body) = send(&url, &full_request()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": UPSTREAM_FAILURE_MESSAGE }));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_500() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: "<html>gateway</html>".to_string(),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let (status, body) = send(&url, &full_request()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": UPSTREAM_FAILURE_MESSAGE }));
    }

    #[tokio::test]
    async fn test_cors_preflight_is_allowed() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: success_body("unused"),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, &url)
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_only_field_reaches_upstream() {
        let upstream = spawn_upstream(Reply {
            status: StatusCode::OK,
            body: success_body("Generated."),
        })
        .await;
        let url = spawn_relay(&upstream, "{main_topic}|{old_methods}").await;

        let mut request = full_request();
        request["old_methods"] = json!("   ");
        let (status, body) = send(&url, &request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "introduction": "Generated." }));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_generic_500() {
        let upstream = spawn_slow_upstream(
            Reply {
                status: StatusCode::OK,
                body: success_body("too late"),
            },
            Duration::from_secs(3),
        )
        .await;
        let url =
            spawn_relay_with_timeout(&upstream, "{main_topic}", Duration::from_millis(300)).await;

        let (status, body) = send(&url, &full_request()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": UPSTREAM_FAILURE_MESSAGE }));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_relay_keeps_serving_after_caller_disconnects() {
        let upstream = spawn_slow_upstream(
            Reply {
                status: StatusCode::OK,
                body: success_body("Still here."),
            },
            Duration::from_millis(500),
        )
        .await;
        let url = spawn_relay(&upstream, "{main_topic}").await;

        let impatient = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let abandoned = impatient.post(&url).json(&full_request()).send().await;
        assert!(abandoned.is_err());

        // Let the abandoned generation finish against the closed connection.
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(upstream.calls(), 1);

        let (status, body) = send(&url, &full_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "introduction": "Still here." }));
        assert_eq!(upstream.calls(), 2);
    }
}
