use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::broadcast::job_progress::{JobPhase, JobProgressTracker};
use crate::job::JobId;
use crate::storage::UploadProgress;

/// Events emitted by the pipeline while submitting.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Phase {
        phase: JobPhase,
        progress: u8,
        message: String,
    },
    Created {
        job_id: JobId,
        progress: u8,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Bridges pipeline events to the job progress broadcast channel.
pub struct BroadcastProgress {
    tracker: JobProgressTracker,
}

impl BroadcastProgress {
    pub fn new(tracker: JobProgressTracker) -> Self {
        Self { tracker }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase {
                phase,
                progress,
                message,
            } => {
                self.tracker.update_phase(phase, progress, &message);
            }
            ProgressEvent::Created { job_id, progress } => {
                self.tracker.set_job_id(&job_id);
                self.tracker
                    .update_phase(JobPhase::Pending, progress, "Job created");
            }
            ProgressEvent::Failed { error } => {
                self.tracker.failed(&error);
            }
        }
    }
}

/// Maps raw transfer progress into a presentation sub-range.
///
/// Output never decreases, even if the transport reports out of order.
#[derive(Debug)]
pub struct ProgressRemapper {
    start: u8,
    end: u8,
    current: AtomicU8,
}

impl ProgressRemapper {
    pub fn new(start: u8, end: u8) -> Self {
        let start = start.min(100);
        let end = end.clamp(start, 100);
        Self {
            start,
            end,
            current: AtomicU8::new(start),
        }
    }

    /// Records a raw 0-100 value and returns the remapped one.
    pub fn map(&self, raw: u8) -> u8 {
        let raw = u16::from(raw.min(100));
        let span = u16::from(self.end - self.start);
        let mapped = self.start + (span * raw / 100) as u8;
        let previous = self.current.fetch_max(mapped, Ordering::AcqRel);
        previous.max(mapped)
    }

    pub fn current(&self) -> u8 {
        self.current.load(Ordering::Acquire)
    }
}

/// Feeds remapped upload progress to a reporter.
pub struct RemappedUploadProgress {
    remapper: ProgressRemapper,
    reporter: Arc<dyn ProgressReporter>,
}

impl RemappedUploadProgress {
    pub fn new(remapper: ProgressRemapper, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { remapper, reporter }
    }
}

impl UploadProgress for RemappedUploadProgress {
    fn on_progress(&self, percent: u8) {
        let before = self.remapper.current();
        let progress = self.remapper.map(percent);
        if progress > before || percent == 100 {
            self.reporter.report(ProgressEvent::Phase {
                phase: JobPhase::Uploading,
                progress,
                message: format!("Uploading {}%", percent.min(100)),
            });
        }
    }
}
