use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque job identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Some endpoints return numeric ids.
impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(JobId(s)),
            Value::Number(n) => Ok(JobId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number job id, got {}",
                other
            ))),
        }
    }
}

/// Kind of backend job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Short voice note; transcribed, summarized and categorized.
    Flash,
    /// Meeting recording; transcript, summary, mind map, speakers.
    Meeting,
}

impl JobKind {
    pub fn create_path(&self) -> &'static str {
        match self {
            JobKind::Flash => "/api/v1/flash/create",
            JobKind::Meeting => "/api/v1/meeting/create",
        }
    }

    pub fn status_path(&self, id: &JobId) -> String {
        match self {
            JobKind::Flash => format!("/api/v1/flash/{}/ai-status", id),
            JobKind::Meeting => format!("/api/v1/meeting/{}/status", id),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Flash => write!(f, "flash"),
            JobKind::Meeting => write!(f, "meeting"),
        }
    }
}

/// Raw `data` of a status response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Result fields (content, summary, keywords, transcript, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StatusReport {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn into_status(self) -> JobStatus {
        JobStatus::from(self)
    }
}

/// Result payload of a completed job.
///
/// Shape is job-type specific; only presence is checked client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobResult(pub Map<String, Value>);

impl JobResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn content(&self) -> Option<&str> {
        self.str_field("content")
            .or_else(|| self.str_field("transcript"))
    }

    pub fn summary(&self) -> Option<&str> {
        self.str_field("summary")
    }

    pub fn category(&self) -> Option<&str> {
        self.str_field("category")
    }

    pub fn keywords(&self) -> Vec<String> {
        match self.get("keywords") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            // Some rows store keywords as a JSON-encoded string.
            Some(Value::String(s)) => serde_json::from_str(s).unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

/// Client-side view of a job's status.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed(JobResult),
    Failed(String),
    /// Any status string the client does not know; treated as non-terminal.
    Unrecognized(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }

    pub fn label(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed(_) => "completed",
            JobStatus::Failed(_) => "failed",
            JobStatus::Unrecognized(s) => s,
        }
    }
}

impl From<StatusReport> for JobStatus {
    fn from(report: StatusReport) -> Self {
        match report.status.as_str() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed(JobResult(report.fields)),
            "failed" => JobStatus::Failed(
                report
                    .error
                    .or(report.message)
                    .unwrap_or_default(),
            ),
            other => JobStatus::Unrecognized(other.to_string()),
        }
    }
}
