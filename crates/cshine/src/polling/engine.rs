use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::api::JobBackend;
use crate::broadcast::{JobPhase, JobProgressBroadcaster, JobProgressEvent};
use crate::config::PollingConfig;
use crate::error::{ClientError, Result};
use crate::job::{JobId, JobKind, JobResult, JobStatus, StatusReport};

/// Observer of every decoded status report, terminal ones included.
pub type TickFn = dyn FnMut(&StatusReport) + Send;

struct TickEvents<'a> {
    progress: Option<&'a JobProgressBroadcaster>,
    kind: JobKind,
    id: &'a JobId,
}

impl TickEvents<'_> {
    fn emit(&self, phase: JobPhase, percent: u8, message: &str, error: Option<&str>) {
        let Some(broadcaster) = self.progress else {
            return;
        };
        let mut event = JobProgressEvent::for_job(self.kind, self.id, phase, percent, message);
        if let Some(error) = error {
            event = event.with_error(error);
        }
        broadcaster.send(event);
    }
}

/// Sleeps unless cancelled first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Polls a job until it completes, fails, runs out of attempts or is cancelled.
pub async fn poll_job(
    backend: &dyn JobBackend,
    kind: JobKind,
    id: &JobId,
    config: &PollingConfig,
    cancel: &CancellationToken,
) -> Result<JobResult> {
    poll_job_with_progress(backend, kind, id, config, cancel, None).await
}

/// Like [`poll_job`], also broadcasting one event per tick.
///
/// Ticks are sequential: the next query is scheduled `interval` after the
/// previous one settles. Errors during a tick are transient and consume one
/// attempt; the last one is reported in `Timeout`.
pub async fn poll_job_with_progress(
    backend: &dyn JobBackend,
    kind: JobKind,
    id: &JobId,
    config: &PollingConfig,
    cancel: &CancellationToken,
    progress: Option<&JobProgressBroadcaster>,
) -> Result<JobResult> {
    poll_job_observed(backend, kind, id, config, cancel, progress, None).await
}

/// Like [`poll_job_with_progress`], handing each status report to `on_tick`
/// before it is classified. Reports arriving after cancellation are not
/// observed.
pub async fn poll_job_observed(
    backend: &dyn JobBackend,
    kind: JobKind,
    id: &JobId,
    config: &PollingConfig,
    cancel: &CancellationToken,
    progress: Option<&JobProgressBroadcaster>,
    mut on_tick: Option<&mut TickFn>,
) -> Result<JobResult> {
    let ticks = TickEvents {
        progress,
        kind,
        id,
    };

    let span = info_span!("poll_job", kind = %kind, job_id = %id);
    async move {
        sleep_or_cancel(config.initial_delay(), cancel).await?;

        let max_attempts = config.max_attempts.max(1);
        let mut attempts = 0u32;
        let mut last_error: Option<String> = None;

        loop {
            attempts += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                outcome = backend.job_status(kind, id) => outcome,
            };
            // A response racing a cancel is dropped.
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }

            match outcome {
                Ok(report) => {
                    if let Some(observe) = on_tick.as_deref_mut() {
                        observe(&report);
                    }
                    let percent = report.progress.unwrap_or(0);
                    match JobStatus::from(report) {
                        JobStatus::Completed(result) => {
                            info!(attempts, "Job completed");
                            ticks.emit(JobPhase::Completed, 100, "Completed", None);
                            return Ok(result);
                        }
                        JobStatus::Failed(detail) => {
                            warn!(attempts, error = %detail, "Job failed");
                            ticks.emit(JobPhase::Failed, percent, "Failed", Some(detail.as_str()));
                            return Err(ClientError::JobFailed(detail));
                        }
                        JobStatus::Pending => {
                            debug!(attempts, "Job pending");
                            ticks.emit(JobPhase::Pending, percent, "Pending", None);
                        }
                        JobStatus::Processing => {
                            debug!(attempts, "Job processing");
                            ticks.emit(JobPhase::Processing, percent, "Processing", None);
                        }
                        JobStatus::Unrecognized(status) => {
                            debug!(attempts, status = %status, "Unrecognized job status, still waiting");
                            ticks.emit(JobPhase::Processing, percent, &status, None);
                        }
                    }
                }
                Err(e) => {
                    warn!(attempts, error = %e, "Status check failed");
                    last_error = Some(e.user_message());
                }
            }

            if attempts >= max_attempts {
                warn!(attempts, "Polling budget exhausted");
                ticks.emit(JobPhase::TimedOut, 0, "Timed out", last_error.as_deref());
                return Err(ClientError::Timeout {
                    attempts,
                    last_error,
                });
            }

            sleep_or_cancel(config.interval(), cancel).await?;
        }
    }
    .instrument(span)
    .await
}
