//! Broadcast channels for job progress and user-facing notices.
//!
//! Any front end (CLI, desktop shell, tests) subscribes to these instead of
//! being called back directly.

pub mod job_progress;
pub mod notifier;

pub use job_progress::{
    JobPhase, JobProgressBroadcaster, JobProgressEvent, JobProgressTracker, ProgressStatus,
};
pub use notifier::{Notice, NoticeLevel, Notifier};
