//! Reqwest-based client for the Piston code execution API.
//!
//! One POST per run, no retries. Whatever happens, `execute` hands back an
//! `ExecutionOutcome`; failures are folded into `TransportError`.

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::language::Language;

pub mod error;
pub mod outcome;

pub use error::ExecutionError;
pub use outcome::{ExecutionOutcome, NotificationKind};

/// User-authored source text plus its declared language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub language: Language,
    pub source: String,
}

impl Snippet {
    pub fn new(language: Language, source: impl Into<String>) -> Self {
        Self { language, source: source.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub content: String,
}

/// Body of `POST /execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<SourceFile>,
}

impl ExecutionRequest {
    /// The version always comes from the pinned table, never from the user.
    pub fn from_snippet(snippet: &Snippet) -> Self {
        Self {
            language: snippet.language.id().to_string(),
            version: snippet.language.version().to_string(),
            files: vec![SourceFile { content: snippet.source.clone() }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub run: RunStage,
    #[serde(default)]
    pub compile: Option<CompileStage>,
}

/// The `run` block is the only part the outcome depends on, so its two
/// string fields are mandatory.
#[derive(Debug, Clone, Deserialize)]
pub struct RunStage {
    pub output: String,
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileStage {
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PistonClient {
    http: reqwest::Client,
    base_url: String,
}

impl PistonClient {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_http(http, cfg.piston_api_url()))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn execute(&self, snippet: &Snippet) -> ExecutionOutcome {
        match self.try_execute(snippet).await {
            Ok(resp) => ExecutionOutcome::from_run(&resp.run.output, &resp.run.stderr),
            Err(err) => {
                warn!(language = %snippet.language, error = %err, "execution request failed");
                err.into()
            }
        }
    }

    pub async fn try_execute(&self, snippet: &Snippet) -> Result<ExecuteResponse, ExecutionError> {
        let url = format!("{}/execute", self.base_url);
        let body = ExecutionRequest::from_snippet(snippet);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        info!(
            language = %body.language,
            version = %body.version,
            bytes = snippet.source.len(),
            "submitting code"
        );
        let started = Instant::now();

        let resp = self.http.post(url).headers(headers).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let parsed = parse_response(&text);
        let result = match parsed {
            Ok(ok) => Ok(ok),
            Err(err) if status.is_success() => Err(err),
            Err(_) => Err(ExecutionError::Status { status, message: error_message(&text) }),
        }?;

        debug!(
            status = %status,
            code = ?result.run.code,
            signal = ?result.run.signal,
            compile_code = ?result.compile.as_ref().and_then(|c| c.code),
            runtime = ?result.version,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "execution finished"
        );
        Ok(result)
    }
}

/// Validate the body against the expected shape before touching it.
pub fn parse_response(text: &str) -> Result<ExecuteResponse, ExecutionError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.get("run").is_some_and(Value::is_object) {
        return Err(ExecutionError::Schema("missing `run` object".into()));
    }
    serde_json::from_value(value).map_err(|e| ExecutionError::Schema(e.to_string()))
}

/// Piston reports failures as `{"message": "..."}`.
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
