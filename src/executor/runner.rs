use std::time::Instant;

use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response,
};
use thiserror::Error;

use super::models::{
    ExecuteOptions, ExecutionOutcome, ExecutionResult, ResponsePayload, VersionInfo,
};

pub const DEFAULT_HEALTH_PATH: &str = "/health";
const VERSION_PATH: &str = "/version";
const UNKNOWN_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Error)]
enum TransportError {
    #[error("invalid HTTP method {0}")]
    InvalidMethod(String),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Issues single-shot requests against one search server.
///
/// Holds configuration only; every call builds its own client, so calls
/// running concurrently share nothing.
#[derive(Debug, Clone)]
pub struct Executor {
    base_url: String,
    api_key: String,
    health_path: String,
}

impl Executor {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Sends one request and folds every outcome into an [`ExecutionResult`].
    pub async fn execute(&self, options: ExecuteOptions) -> ExecutionResult {
        let url = format!("{}{}", self.base_url, options.endpoint);
        let headers = merge_headers(
            vec![(AUTHORIZATION.as_str().to_string(), self.bearer())],
            &options.headers,
        );

        tracing::debug!(method = %options.method, %url, "dispatching request");
        let start = Instant::now();

        let response = match send(&options.method, &url, &headers, options.body).await {
            Ok(response) => response,
            Err(err) => return failed(err, start),
        };
        let elapsed_ms = elapsed_millis(start);
        let status = response.status().as_u16();

        match read_payload(response).await {
            Ok(data) => {
                tracing::debug!(status, elapsed_ms, "response received");
                ExecutionResult {
                    outcome: ExecutionOutcome::Completed { status, data },
                    elapsed_ms,
                }
            }
            Err(err) => failed(err, start),
        }
    }

    /// True only when the health endpoint answers with a 2xx status.
    pub async fn check_connection(&self) -> bool {
        let url = format!("{}{}", self.base_url, self.health_path);
        match Client::new()
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(%url, error = %err, "health probe failed");
                false
            }
        }
    }

    pub async fn fetch_version(&self) -> Option<VersionInfo> {
        let url = format!("{}{}", self.base_url, VERSION_PATH);
        let response = Client::new()
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<VersionInfo>().await.ok()
    }
}

async fn send(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<String>,
) -> Result<Response, TransportError> {
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| TransportError::InvalidMethod(method.to_string()))?;

    let mut request_builder = Client::new().request(method, url);
    for (name, value) in headers {
        request_builder = request_builder.header(name, value);
    }
    if let Some(body) = body.filter(|body| !body.is_empty()) {
        request_builder = request_builder.body(body);
    }

    Ok(request_builder.send().await?)
}

async fn read_payload(response: Response) -> Result<ResponsePayload, TransportError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    let text = response.text().await?;
    if is_json {
        Ok(ResponsePayload::Json(serde_json::from_str(&text)?))
    } else {
        Ok(ResponsePayload::Text(text))
    }
}

fn failed(err: TransportError, start: Instant) -> ExecutionResult {
    let elapsed_ms = elapsed_millis(start);
    let mut error = format!("{:#}", anyhow::Error::new(err));
    if error.trim().is_empty() {
        error = UNKNOWN_ERROR.to_string();
    }
    tracing::warn!(%error, elapsed_ms, "request failed");
    ExecutionResult {
        outcome: ExecutionOutcome::Failed { error },
        elapsed_ms,
    }
}

fn elapsed_millis(start: Instant) -> u64 {
    (start.elapsed().as_secs_f64() * 1000.0).round() as u64
}

/// Caller headers win over defaults; names compare case-insensitively.
fn merge_headers(
    defaults: Vec<(String, String)>,
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = defaults;
    for (name, value) in overrides {
        merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        merged.push((name.clone(), value.clone()));
    }
    merged
}
