use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::broadcast::{JobProgressBroadcaster, Notifier};
use crate::context::AppContext;
use crate::error::{ClientError, Result};
use crate::job::{JobId, JobKind, JobStatus};
use crate::pipeline::{
    BroadcastProgress, JobMetadata, ProgressEvent, ProgressReporter, SubmitPipeline,
    UploadArtifact,
};
use crate::polling::{PollCallbacks, PollingRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Processing,
    Completed,
    Failed,
}

/// What the meeting upload page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadViewState {
    pub status: UploadStatus,
    pub progress: u8,
    pub meeting_id: Option<JobId>,
    pub error_message: Option<String>,
}

impl Default for UploadViewState {
    fn default() -> Self {
        Self {
            status: UploadStatus::Idle,
            progress: 0,
            meeting_id: None,
            error_message: None,
        }
    }
}

type StateSender = Arc<watch::Sender<UploadViewState>>;

fn fail(state: &StateSender, notifier: &Notifier, err: &ClientError) {
    let message = err.user_message();
    state.send_modify(|s| {
        s.status = UploadStatus::Failed;
        s.error_message = Some(message.clone());
    });
    notifier.error(&message);
}

/// Mirrors pipeline progress into the view state.
struct ViewProgress {
    state: StateSender,
    inner: BroadcastProgress,
}

impl ProgressReporter for ViewProgress {
    fn report(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Phase { progress, .. } => {
                let progress = *progress;
                self.state.send_modify(|s| s.progress = s.progress.max(progress));
            }
            ProgressEvent::Created { job_id, progress } => {
                let (job_id, progress) = (job_id.clone(), *progress);
                self.state.send_modify(|s| {
                    s.status = UploadStatus::Processing;
                    s.progress = s.progress.max(progress);
                    s.meeting_id = Some(job_id);
                });
            }
            ProgressEvent::Failed { .. } => {}
        }
        self.inner.report(event);
    }
}

/// Drives the meeting upload page.
///
/// Polling belongs to this controller: dropping it abandons any meeting it
/// is still waiting on.
pub struct MeetingUploadController {
    pipeline: SubmitPipeline,
    registry: PollingRegistry,
    notifier: Notifier,
    progress: JobProgressBroadcaster,
    state: StateSender,
}

impl MeetingUploadController {
    pub fn new(ctx: &AppContext) -> Self {
        Self::with_parts(
            ctx.pipeline(),
            ctx.page_registry(),
            ctx.notifier().clone(),
            ctx.progress().clone(),
        )
    }

    pub fn with_parts(
        pipeline: SubmitPipeline,
        registry: PollingRegistry,
        notifier: Notifier,
        progress: JobProgressBroadcaster,
    ) -> Self {
        let (state, _) = watch::channel(UploadViewState::default());
        Self {
            pipeline,
            registry,
            notifier,
            progress,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadViewState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> UploadViewState {
        self.state.borrow().clone()
    }

    pub fn registry(&self) -> &PollingRegistry {
        &self.registry
    }

    /// Uploads the recording, creates the meeting and starts polling it.
    pub async fn submit(
        &self,
        artifact: Option<&UploadArtifact>,
        metadata: JobMetadata,
    ) -> Result<JobId> {
        if metadata.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(self.reject("Please enter a meeting title"));
        }
        let Some(artifact) = artifact else {
            return Err(self.reject("Please select an audio file"));
        };

        self.state.send_replace(UploadViewState {
            status: UploadStatus::Uploading,
            ..UploadViewState::default()
        });

        let reporter = Arc::new(ViewProgress {
            state: Arc::clone(&self.state),
            inner: BroadcastProgress::new(
                self.progress.start(JobKind::Meeting, &artifact.file_name()),
            ),
        });

        match self
            .pipeline
            .submit(JobKind::Meeting, artifact, metadata, reporter)
            .await
        {
            Ok(job) => {
                info!(meeting_id = %job.id, "Meeting created, waiting for processing");
                self.track(job.id.clone());
                Ok(job.id)
            }
            Err(e) => {
                fail(&self.state, &self.notifier, &e);
                Err(e)
            }
        }
    }

    /// Resumes a meeting created earlier.
    ///
    /// Reads the stored status first and only polls while the meeting is
    /// still pending or processing. Settled meetings are shown as they are,
    /// without a new notice.
    pub async fn resume(&self, meeting_id: JobId) -> Result<UploadStatus> {
        let report = match self
            .pipeline
            .backend()
            .stored_status(JobKind::Meeting, &meeting_id)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                fail(&self.state, &self.notifier, &e);
                return Err(e);
            }
        };

        let created = self.pipeline.progress_config().created;
        let mut view = UploadViewState {
            meeting_id: Some(meeting_id.clone()),
            ..UploadViewState::default()
        };
        let poll = match JobStatus::from(report) {
            JobStatus::Pending => {
                view.status = UploadStatus::Processing;
                true
            }
            JobStatus::Processing => {
                view.status = UploadStatus::Processing;
                view.progress = created;
                true
            }
            JobStatus::Completed(_) => {
                view.status = UploadStatus::Completed;
                view.progress = 100;
                false
            }
            JobStatus::Failed(detail) => {
                view.status = UploadStatus::Failed;
                view.error_message = Some(detail).filter(|d| !d.is_empty());
                false
            }
            JobStatus::Unrecognized(status) => {
                warn!(meeting_id = %meeting_id, status = %status, "Not resuming meeting in unknown state");
                false
            }
        };

        let status = view.status;
        self.state.send_replace(view);
        if poll {
            self.track(meeting_id);
        }
        Ok(status)
    }

    fn reject(&self, message: &str) -> ClientError {
        self.notifier.error(message);
        ClientError::Validation(message.to_string())
    }

    fn track(&self, meeting_id: JobId) {
        let tick_state = Arc::clone(&self.state);
        let on_done_state = Arc::clone(&self.state);
        let on_error_state = Arc::clone(&self.state);
        let notifier = self.notifier.clone();

        let callbacks = PollCallbacks::new()
            .on_tick(move |report| {
                if let Some(progress) = report.progress {
                    let progress = progress.min(100);
                    tick_state.send_modify(|s| s.progress = s.progress.max(progress));
                }
            })
            .on_done(move |_| {
                on_done_state.send_modify(|s| {
                    s.status = UploadStatus::Completed;
                    s.progress = 100;
                });
            })
            .on_error(move |e| fail(&on_error_state, &notifier, &e));

        self.registry.start(JobKind::Meeting, meeting_id, callbacks);
    }
}
