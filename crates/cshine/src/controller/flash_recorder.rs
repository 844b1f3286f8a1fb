use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::broadcast::{JobProgressBroadcaster, Notifier};
use crate::context::AppContext;
use crate::error::Result;
use crate::job::{JobId, JobKind, JobResult};
use crate::pipeline::{BroadcastProgress, JobMetadata, SubmitPipeline, SubmittedJob, UploadArtifact};
use crate::polling::{PollCallbacks, PollingRegistry};

/// Tells the home page to reload its note list.
#[derive(Debug, Clone, PartialEq)]
pub enum FlashRefresh {
    /// Created with placeholder content.
    Created(JobId),
    /// AI processing finished.
    Processed(JobResult),
}

/// Submits recorded flash notes from the home page.
///
/// Tracking goes to the application-wide registry, so it survives the page.
pub struct FlashRecorderController {
    pipeline: SubmitPipeline,
    registry: Arc<PollingRegistry>,
    notifier: Notifier,
    progress: JobProgressBroadcaster,
    refresh: mpsc::UnboundedSender<FlashRefresh>,
}

impl FlashRecorderController {
    pub fn new(ctx: &AppContext) -> (Self, mpsc::UnboundedReceiver<FlashRefresh>) {
        Self::with_parts(
            ctx.pipeline(),
            ctx.flash_registry(),
            ctx.notifier().clone(),
            ctx.progress().clone(),
        )
    }

    pub fn with_parts(
        pipeline: SubmitPipeline,
        registry: Arc<PollingRegistry>,
        notifier: Notifier,
        progress: JobProgressBroadcaster,
    ) -> (Self, mpsc::UnboundedReceiver<FlashRefresh>) {
        let (refresh, refresh_rx) = mpsc::unbounded_channel();
        let controller = Self {
            pipeline,
            registry,
            notifier,
            progress,
            refresh,
        };
        (controller, refresh_rx)
    }

    pub async fn submit_recording(
        &self,
        artifact: &UploadArtifact,
        metadata: JobMetadata,
    ) -> Result<SubmittedJob> {
        let reporter = Arc::new(BroadcastProgress::new(
            self.progress.start(JobKind::Flash, &artifact.file_name()),
        ));

        let on_done_refresh = self.refresh.clone();
        let notifier = self.notifier.clone();
        let callbacks = PollCallbacks::new()
            .on_done(move |result| {
                // Page may be gone
                let _ = on_done_refresh.send(FlashRefresh::Processed(result));
            })
            .on_error(move |e| notifier.error(&e.user_message()));

        match self
            .pipeline
            .submit_and_track(
                JobKind::Flash,
                artifact,
                metadata,
                reporter,
                &self.registry,
                callbacks,
            )
            .await
        {
            Ok(job) => {
                info!(flash_id = %job.id, "Flash note created");
                let _ = self.refresh.send(FlashRefresh::Created(job.id.clone()));
                Ok(job)
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }
}
