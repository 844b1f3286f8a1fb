//! A backend that accepts creation payloads only as JSON, decoded into the
//! server's own request shapes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;

use super::mock::signature;
use cshine::api::{CreateJobRequest, CreatedJob, JobBackend, OssSignature};
use cshine::error::{ClientError, Result};
use cshine::job::{JobId, JobKind, StatusReport};

/// Server-side meeting creation body.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingCreate {
    pub title: String,
    pub audio_url: String,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub meeting_date: Option<String>,
    #[serde(default)]
    pub audio_duration: Option<u32>,
}

/// Server-side flash note creation body.
#[derive(Debug, Clone, Deserialize)]
pub struct FlashCreate {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_duration: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum StoredJob {
    Meeting(MeetingCreate),
    Flash(FlashCreate),
}

struct Record {
    job: StoredJob,
    queries: u32,
}

fn unprocessable(message: impl Into<String>) -> ClientError {
    ClientError::api(422, message)
}

/// Stores jobs as the server would and reports them `pending`, then
/// `processing` forever.
#[derive(Default)]
pub struct ContractBackend {
    jobs: Mutex<HashMap<JobId, Record>>,
    next_id: AtomicU32,
}

impl ContractBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stored(&self, id: &JobId) -> Option<StoredJob> {
        self.jobs.lock().unwrap().get(id).map(|r| r.job.clone())
    }

    fn decode(kind: JobKind, body: &[u8]) -> Result<StoredJob> {
        match kind {
            JobKind::Meeting => {
                let meeting: MeetingCreate =
                    serde_json::from_slice(body).map_err(|e| unprocessable(e.to_string()))?;
                if meeting.title.is_empty() {
                    return Err(unprocessable("title must not be empty"));
                }
                Ok(StoredJob::Meeting(meeting))
            }
            JobKind::Flash => {
                let flash: FlashCreate =
                    serde_json::from_slice(body).map_err(|e| unprocessable(e.to_string()))?;
                if flash.content.is_empty() {
                    return Err(unprocessable("content must not be empty"));
                }
                Ok(StoredJob::Flash(flash))
            }
        }
    }
}

#[async_trait]
impl JobBackend for ContractBackend {
    async fn oss_signature(&self) -> Result<OssSignature> {
        Ok(signature())
    }

    async fn create_job(&self, kind: JobKind, request: &CreateJobRequest) -> Result<CreatedJob> {
        let body = serde_json::to_vec(request)?;
        let job = Self::decode(kind, &body)?;

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = JobId::new(format!("{}-{}", kind, n));
        self.jobs
            .lock()
            .unwrap()
            .insert(id.clone(), Record { job, queries: 0 });

        Ok(CreatedJob {
            id,
            status: Some("pending".to_string()),
        })
    }

    async fn job_status(&self, _kind: JobKind, id: &JobId) -> Result<StatusReport> {
        let mut jobs = self.jobs.lock().unwrap();
        let record = jobs
            .get_mut(id)
            .ok_or_else(|| ClientError::api(404, "resource not found"))?;
        record.queries += 1;
        let status = if record.queries == 1 { "pending" } else { "processing" };
        Ok(StatusReport::new(status))
    }
}
