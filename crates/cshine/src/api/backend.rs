use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::models::OssSignature;
use crate::error::Result;
use crate::http::ApiClient;
use crate::job::{JobId, JobKind, StatusReport};

/// Job-creation payload shared by flash notes and meetings.
///
/// Built from an uploaded artifact (URL and duration) plus caller metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub audio_url: String,
    pub audio_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Flash notes require non-empty content at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
}

/// Identity of a job the backend just registered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedJob {
    pub id: JobId,
    #[serde(default)]
    pub status: Option<String>,
}

/// The slice of the backend the submit pipeline and the polling engine need.
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn oss_signature(&self) -> Result<OssSignature>;

    async fn create_job(&self, kind: JobKind, request: &CreateJobRequest) -> Result<CreatedJob>;

    async fn job_status(&self, kind: JobKind, id: &JobId) -> Result<StatusReport>;

    /// Status as stored on the job record, read before deciding to poll.
    async fn stored_status(&self, kind: JobKind, id: &JobId) -> Result<StatusReport> {
        self.job_status(kind, id).await
    }
}

#[async_trait]
impl JobBackend for ApiClient {
    async fn oss_signature(&self) -> Result<OssSignature> {
        ApiClient::oss_signature(self).await
    }

    async fn create_job(&self, kind: JobKind, request: &CreateJobRequest) -> Result<CreatedJob> {
        match kind {
            JobKind::Flash => {
                let flash = self.create_flash(request).await?;
                Ok(CreatedJob {
                    id: flash.id,
                    status: None,
                })
            }
            JobKind::Meeting => {
                let meeting = self.create_meeting(request).await?;
                Ok(CreatedJob {
                    id: meeting.id,
                    status: Some(meeting.status).filter(|s| !s.is_empty()),
                })
            }
        }
    }

    async fn job_status(&self, kind: JobKind, id: &JobId) -> Result<StatusReport> {
        match kind {
            JobKind::Flash => self.flash_ai_status(id).await,
            JobKind::Meeting => self.meeting_status(id).await,
        }
    }

    async fn stored_status(&self, kind: JobKind, id: &JobId) -> Result<StatusReport> {
        match kind {
            JobKind::Flash => self.flash_ai_status(id).await,
            JobKind::Meeting => {
                let meeting = self.meeting_detail(id).await?;
                Ok(StatusReport::new(&meeting.status))
            }
        }
    }
}
