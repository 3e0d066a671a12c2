mod routes;
mod upstream;

pub use routes::router;
pub use upstream::GeminiClient;

use crate::prelude::{eprintln, *};
use introgen_core::form::describe_fields;
use introgen_core::prompt::{missing_placeholders, DEFAULT_TEMPLATE};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, clap::Parser)]
#[command(name = "serve")]
#[command(about = "Run the introduction relay")]
pub struct App {
    /// Port to listen on
    #[arg(short, long, env = "INTROGEN_PORT", default_value = "3001")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "INTROGEN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Gemini model used for generation
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// File holding the instruction template (uses the built-in one if unset)
    #[arg(long, env = "INTROGEN_TEMPLATE_FILE")]
    pub template_file: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "INTROGEN_UPSTREAM_TIMEOUT", default_value = "60")]
    pub timeout: u64,
}

/// Upstream connection settings
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Immutable state shared by every request handler
pub struct RelayState {
    pub upstream: GeminiClient,
    pub template: String,
}

impl RelayState {
    pub fn new(config: UpstreamConfig, template: String) -> Result<Self> {
        Ok(Self {
            upstream: GeminiClient::new(&config)?,
            template,
        })
    }
}

/// Load the instruction template from `path`, or fall back to the built-in one.
pub async fn load_template(path: Option<&std::path::Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(DEFAULT_TEMPLATE.to_string());
    };

    let template = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read template file '{}'", path.display()))?;

    if template.trim().is_empty() {
        return Err(eyre!("Template file '{}' is empty", path.display()));
    }

    let missing = missing_placeholders(&template);
    if !missing.is_empty() {
        log::warn!(
            "template {} does not reference: {}",
            path.display(),
            describe_fields(&missing)
        );
    }

    Ok(template)
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if app.api_key.trim().is_empty() {
        return Err(eyre!("GEMINI_API_KEY is set but empty"));
    }

    let template = load_template(app.template_file.as_deref()).await?;
    let config = UpstreamConfig {
        api_base: app.api_base,
        model: app.model,
        api_key: app.api_key,
        timeout: Duration::from_secs(app.timeout),
    };

    log::info!(
        "using model {} with API key ending in {}",
        config.model,
        key_suffix(&config.api_key)
    );

    let state = Arc::new(RelayState::new(config, template)?);
    log::debug!("forwarding prompts to {}", state.upstream.endpoint());
    let addr = format!("{}:{}", app.host, app.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    if global.verbose {
        eprintln!("Relay listening on http://{}", addr);
        eprintln!("Generate endpoint: http://{}/api/generate-intro", addr);
    }
    log::info!("relay listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    log::info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Last four characters of a credential, for log lines.
fn key_suffix(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    chars[chars.len().saturating_sub(4)..].iter().collect()
}
