//! Scripted stand-ins for the backend and the storage host.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use cshine::api::{CreateJobRequest, CreatedJob, JobBackend, OssSignature};
use cshine::error::{ClientError, NetworkErrorKind, Result};
use cshine::job::{JobId, JobKind, StatusReport};
use cshine::pipeline::UploadArtifact;
use cshine::storage::{StorageUploader, UploadProgress};

/// One scripted status response.
#[derive(Debug, Clone)]
pub enum Step {
    Pending,
    Processing,
    /// `processing` carrying a progress percentage.
    ProcessingAt(u8),
    Status(String),
    Completed,
    Failed(String),
    NetworkError,
}

impl Step {
    fn into_result(self) -> Result<StatusReport> {
        match self {
            Step::Pending => Ok(StatusReport::new("pending")),
            Step::Processing => Ok(StatusReport::new("processing")),
            Step::ProcessingAt(progress) => Ok(StatusReport {
                progress: Some(progress),
                ..StatusReport::new("processing")
            }),
            Step::Status(s) => Ok(StatusReport::new(&s)),
            Step::Completed => Ok(StatusReport::new("completed")
                .with_field("content", json!("buy milk and eggs"))
                .with_field("summary", json!("groceries"))
                .with_field("keywords", json!(["milk", "eggs"]))),
            Step::Failed(detail) => Ok(StatusReport::new("failed").with_error(&detail)),
            Step::NetworkError => Err(ClientError::network(NetworkErrorKind::Unreachable)),
        }
    }
}

/// Replays `script` one step per status call, then `Processing` forever.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Step>>,
    status_delay: Mutex<Option<Duration>>,
    sign_error: Mutex<Option<String>>,
    job_id: Mutex<String>,
    stored: Mutex<StatusReport>,
    pub sign_calls: AtomicU32,
    pub create_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub created: Mutex<Vec<(JobKind, CreateJobRequest)>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            status_delay: Mutex::new(None),
            sign_error: Mutex::new(None),
            job_id: Mutex::new("job-1".to_string()),
            stored: Mutex::new(StatusReport::new("processing")),
            sign_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            created: Mutex::new(Vec::new()),
        })
    }

    /// Every status call takes `delay` before answering.
    pub fn delay_status(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_signature(&self, message: &str) {
        *self.sign_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn assign_job_id(&self, id: &str) {
        *self.job_id.lock().unwrap() = id.to_string();
    }

    /// What the job record says before any polling.
    pub fn store_status(&self, report: StatusReport) {
        *self.stored.lock().unwrap() = report;
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> u32 {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn oss_signature(&self) -> Result<OssSignature> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.sign_error.lock().unwrap().clone() {
            return Err(ClientError::api(500, message));
        }
        Ok(signature())
    }

    async fn create_job(&self, kind: JobKind, request: &CreateJobRequest) -> Result<CreatedJob> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push((kind, request.clone()));
        Ok(CreatedJob {
            id: JobId::new(self.job_id.lock().unwrap().clone()),
            status: Some("pending".to_string()),
        })
    }

    async fn job_status(&self, _kind: JobKind, _id: &JobId) -> Result<StatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Processing);
        step.into_result()
    }

    async fn stored_status(&self, _kind: JobKind, _id: &JobId) -> Result<StatusReport> {
        Ok(self.stored.lock().unwrap().clone())
    }
}

pub fn signature() -> OssSignature {
    OssSignature {
        host: "https://bucket.oss.example.com".to_string(),
        key: "audio/2024/rec.m4a".to_string(),
        policy: "policy".to_string(),
        accessid: "access".to_string(),
        signature: "sig".to_string(),
        expire: None,
    }
}

/// Reports `steps` as raw progress, then succeeds or fails with `status`.
pub struct MockUploader {
    steps: Vec<u8>,
    reject_status: Option<u16>,
    pub calls: AtomicU32,
}

impl MockUploader {
    pub fn new(steps: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            reject_status: None,
            calls: AtomicU32::new(0),
        })
    }

    pub fn rejecting(status: u16) -> Arc<Self> {
        Arc::new(Self {
            steps: vec![10],
            reject_status: Some(status),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageUploader for MockUploader {
    async fn upload(
        &self,
        signature: &OssSignature,
        _artifact: &UploadArtifact,
        progress: Arc<dyn UploadProgress>,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for step in &self.steps {
            progress.on_progress(*step);
        }
        if let Some(status) = self.reject_status {
            return Err(ClientError::api(status, format!("upload failed: {}", status)));
        }
        progress.on_progress(100);
        Ok(signature.object_url())
    }
}
