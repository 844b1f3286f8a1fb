//! Job progress broadcaster for real-time status streaming.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::job::{JobId, JobKind};

/// Phase of the submit-and-track lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Validating,
    Signing,
    Uploading,
    Creating,
    Pending,
    Processing,
    Completed,
    Failed,
    TimedOut,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Validating => write!(f, "Validating"),
            JobPhase::Signing => write!(f, "Requesting upload credential"),
            JobPhase::Uploading => write!(f, "Uploading"),
            JobPhase::Creating => write!(f, "Creating job"),
            JobPhase::Pending => write!(f, "Pending"),
            JobPhase::Processing => write!(f, "Processing"),
            JobPhase::Completed => write!(f, "Completed"),
            JobPhase::Failed => write!(f, "Failed"),
            JobPhase::TimedOut => write!(f, "Timed out"),
        }
    }
}

/// Overall status derived from the phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Running,
    Completed,
    Failed,
}

impl From<JobPhase> for ProgressStatus {
    fn from(phase: JobPhase) -> Self {
        match phase {
            JobPhase::Completed => ProgressStatus::Completed,
            JobPhase::Failed | JobPhase::TimedOut => ProgressStatus::Failed,
            _ => ProgressStatus::Running,
        }
    }
}

/// Progress event for a submission or a tracked job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// What is being processed, usually the artifact file name.
    pub subject: String,
    /// Backend job id, known once the job is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<JobKind>,
    pub phase: JobPhase,
    pub status: ProgressStatus,
    /// Presentation progress, 0-100.
    pub progress: u8,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobProgressEvent {
    pub fn new(subject: &str, phase: JobPhase, progress: u8, message: &str) -> Self {
        Self {
            subject: subject.to_string(),
            job_id: None,
            kind: None,
            phase,
            status: phase.into(),
            progress: progress.min(100),
            message: message.to_string(),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Event for a job that already exists on the backend.
    pub fn for_job(
        kind: JobKind,
        job_id: &JobId,
        phase: JobPhase,
        progress: u8,
        message: &str,
    ) -> Self {
        let mut event = Self::new(job_id.as_str(), phase, progress, message);
        event.job_id = Some(job_id.clone());
        event.kind = Some(kind);
        event
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Broadcasts job progress events for streaming.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: JobProgressEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }

    /// Creates a tracker for one submission.
    pub fn start(&self, kind: JobKind, subject: &str) -> JobProgressTracker {
        JobProgressTracker::new(kind, subject, Arc::clone(&self.sender))
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Tracks progress for a single submission.
///
/// Progress never goes backwards for the lifetime of the tracker.
pub struct JobProgressTracker {
    kind: JobKind,
    subject: String,
    job_id: Mutex<Option<JobId>>,
    last_progress: Mutex<u8>,
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressTracker {
    pub fn new(
        kind: JobKind,
        subject: &str,
        sender: Arc<broadcast::Sender<JobProgressEvent>>,
    ) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            job_id: Mutex::new(None),
            last_progress: Mutex::new(0),
            sender,
        }
    }

    pub fn set_job_id(&self, job_id: &JobId) {
        *self.job_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(job_id.clone());
    }

    fn emit(&self, phase: JobPhase, progress: u8, message: &str, error: Option<&str>) {
        let progress = {
            let mut last = self.last_progress.lock().unwrap_or_else(|e| e.into_inner());
            *last = (*last).max(progress.min(100));
            *last
        };
        let mut event = JobProgressEvent::new(&self.subject, phase, progress, message);
        event.kind = Some(self.kind);
        event.job_id = self
            .job_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        event.error = error.map(str::to_string);
        let _ = self.sender.send(event);
    }

    pub fn update_phase(&self, phase: JobPhase, progress: u8, message: &str) {
        self.emit(phase, progress, message, None);
    }

    pub fn failed(&self, error: &str) {
        self.emit(JobPhase::Failed, 0, "Submission failed", Some(error));
    }
}
