use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub method: String,
    /// Appended verbatim to the executor's base URL; may carry a query string.
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Json(Value),
    Text(String),
}

/// What happened to a single request.
///
/// `Completed` covers every received HTTP response, including non-2xx ones.
/// `Failed` means no usable response arrived; its status is always 0.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed { status: u16, data: ResponsePayload },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub outcome: ExecutionOutcome,
    /// Wall-clock time until the response (or failure) arrived.
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        matches!(self.outcome, ExecutionOutcome::Completed { status, .. } if (200..300).contains(&status))
    }

    pub fn status(&self) -> u16 {
        match self.outcome {
            ExecutionOutcome::Completed { status, .. } => status,
            ExecutionOutcome::Failed { .. } => 0,
        }
    }

    pub fn data(&self) -> Option<&ResponsePayload> {
        match &self.outcome {
            ExecutionOutcome::Completed { data, .. } => Some(data),
            ExecutionOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ExecutionOutcome::Completed { .. } => None,
            ExecutionOutcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatResult<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a ResponsePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    status: u16,
    processing_time_ms: u64,
}

impl Serialize for ExecutionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        FlatResult {
            success: self.success(),
            data: self.data(),
            error: self.error(),
            status: self.status(),
            processing_time_ms: self.elapsed_ms,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub commit_sha: String,
    pub commit_date: String,
    pub pkg_version: String,
}
