use std::path::PathBuf;
use thiserror::Error;

/// Transport failure classes, each with its own user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Unreachable,
    Other,
}

impl NetworkErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkErrorKind::Timeout => "Request timed out, please try again later",
            NetworkErrorKind::Unreachable => "Network connection failed, please check the network",
            NetworkErrorKind::Other => "Request failed, please try again",
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// Client-side precondition failure. Never reaches the network.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backend answered but reported failure.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 401. Cached credentials have already been cleared.
    #[error("Login expired, please sign in again")]
    AuthExpired,

    #[error("Network error: {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    /// Polling budget exhausted while the job was still running.
    #[error("Job did not finish after {attempts} status checks")]
    Timeout {
        attempts: u32,
        last_error: Option<String>,
    },

    /// The backend marked the job as failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn network(kind: NetworkErrorKind) -> Self {
        ClientError::Network {
            kind,
            message: kind.user_message().to_string(),
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::AuthExpired => "Login expired, please sign in again".to_string(),
            ClientError::Network { message, .. } => message.clone(),
            ClientError::Timeout { .. } => {
                "AI processing timed out, please check again later".to_string()
            }
            ClientError::JobFailed(detail) => {
                if detail.is_empty() {
                    "AI processing failed".to_string()
                } else {
                    format!("AI processing failed: {}", detail)
                }
            }
            ClientError::Cancelled => "Cancelled".to_string(),
            ClientError::Io(e) => format!("File error: {}", e),
            ClientError::Decode(_) => "Unexpected response from server".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() || err.is_request() {
            NetworkErrorKind::Unreachable
        } else {
            NetworkErrorKind::Other
        };
        ClientError::network(kind)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;
