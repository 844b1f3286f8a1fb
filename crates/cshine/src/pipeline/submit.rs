use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use super::artifact::UploadArtifact;
use super::progress::{
    ProgressEvent, ProgressRemapper, ProgressReporter, RemappedUploadProgress,
};
use crate::api::{CreateJobRequest, JobBackend};
use crate::broadcast::JobPhase;
use crate::config::{ClientConfig, ProgressConfig};
use crate::config::schema::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::{ClientError, Result};
use crate::job::{JobId, JobKind};
use crate::polling::{PollCallbacks, PollingRegistry};
use crate::storage::StorageUploader;

/// Shown as flash note content until transcription replaces it.
pub const FLASH_CONTENT_PLACEHOLDER: &str = "Transcribing...";

/// Caller-supplied metadata for a new job.
#[derive(Debug, Clone, Default)]
pub struct JobMetadata {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub participants: Vec<String>,
    pub meeting_date: Option<String>,
    pub folder_id: Option<i64>,
}

impl JobMetadata {
    /// Splits a free-text participant list on ASCII or full-width commas.
    pub fn parse_participants(raw: &str) -> Vec<String> {
        raw.split([',', '，'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn into_request(self, kind: JobKind, audio_url: String, duration: Option<u32>) -> CreateJobRequest {
        let content = match kind {
            JobKind::Flash => Some(
                self.content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| FLASH_CONTENT_PLACEHOLDER.to_string()),
            ),
            JobKind::Meeting => self.content,
        };
        CreateJobRequest {
            audio_url,
            audio_duration: duration,
            title: self.title.filter(|t| !t.trim().is_empty()),
            content,
            category: self.category,
            participants: self.participants,
            meeting_date: self.meeting_date,
            folder_id: self.folder_id,
        }
    }
}

/// A job the backend accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    pub id: JobId,
    pub kind: JobKind,
    pub audio_url: String,
}

/// Validate, sign, upload, create.
///
/// Each call uploads afresh; nothing is cached between submissions.
#[derive(Clone)]
pub struct SubmitPipeline {
    backend: Arc<dyn JobBackend>,
    uploader: Arc<dyn StorageUploader>,
    max_upload_bytes: u64,
    progress: ProgressConfig,
}

impl SubmitPipeline {
    pub fn new(backend: Arc<dyn JobBackend>, uploader: Arc<dyn StorageUploader>) -> Self {
        Self {
            backend,
            uploader,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            progress: ProgressConfig::default(),
        }
    }

    pub fn from_config(
        backend: Arc<dyn JobBackend>,
        uploader: Arc<dyn StorageUploader>,
        config: &ClientConfig,
    ) -> Self {
        Self::new(backend, uploader)
            .with_max_upload_bytes(config.max_upload_bytes)
            .with_progress_config(config.progress)
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn with_progress_config(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn backend(&self) -> &Arc<dyn JobBackend> {
        &self.backend
    }

    pub fn progress_config(&self) -> &ProgressConfig {
        &self.progress
    }

    pub async fn submit(
        &self,
        kind: JobKind,
        artifact: &UploadArtifact,
        metadata: JobMetadata,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<SubmittedJob> {
        let span = info_span!("submit", kind = %kind, file = %artifact.file_name());
        let outcome = self
            .run(kind, artifact, metadata, Arc::clone(&reporter))
            .instrument(span)
            .await;

        if let Err(e) = &outcome {
            warn!(kind = %kind, error = %e, "Submission failed");
            reporter.report(ProgressEvent::Failed {
                error: e.user_message(),
            });
        }
        outcome
    }

    async fn run(
        &self,
        kind: JobKind,
        artifact: &UploadArtifact,
        metadata: JobMetadata,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<SubmittedJob> {
        reporter.report(ProgressEvent::Phase {
            phase: JobPhase::Validating,
            progress: self.progress.upload_start,
            message: "Checking file".to_string(),
        });
        artifact.validate(self.max_upload_bytes)?;

        reporter.report(ProgressEvent::Phase {
            phase: JobPhase::Signing,
            progress: self.progress.upload_start,
            message: "Requesting upload credential".to_string(),
        });
        let signature = self.backend.oss_signature().await?;

        let upload_progress = Arc::new(RemappedUploadProgress::new(
            ProgressRemapper::new(self.progress.upload_start, self.progress.upload_end),
            Arc::clone(&reporter),
        ));
        let audio_url = self
            .uploader
            .upload(&signature, artifact, upload_progress)
            .await?;
        info!(url = %audio_url, "Audio uploaded");

        reporter.report(ProgressEvent::Phase {
            phase: JobPhase::Creating,
            progress: self.progress.upload_end,
            message: "Creating job".to_string(),
        });
        let request = metadata.into_request(kind, audio_url.clone(), artifact.duration_secs());
        let created = self.backend.create_job(kind, &request).await?;
        if created.id.as_str().is_empty() {
            return Err(ClientError::api(200, "server returned no job id"));
        }
        info!(job_id = %created.id, "Job created");

        reporter.report(ProgressEvent::Created {
            job_id: created.id.clone(),
            progress: self.progress.created,
        });

        Ok(SubmittedJob {
            id: created.id,
            kind,
            audio_url,
        })
    }

    /// Submits, then hands the new job to `registry` for polling.
    pub async fn submit_and_track(
        &self,
        kind: JobKind,
        artifact: &UploadArtifact,
        metadata: JobMetadata,
        reporter: Arc<dyn ProgressReporter>,
        registry: &PollingRegistry,
        callbacks: PollCallbacks,
    ) -> Result<SubmittedJob> {
        let job = self.submit(kind, artifact, metadata, reporter).await?;
        registry.start(kind, job.id.clone(), callbacks);
        Ok(job)
    }
}
