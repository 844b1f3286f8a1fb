//! Job status polling.
//!
//! [`poll_job`] is the loop itself; [`PollingRegistry`] runs one loop per job
//! id as a tokio task and ties their lifetime to an owning scope.

pub mod engine;
pub mod registry;

pub use engine::{poll_job, poll_job_observed, poll_job_with_progress, TickFn};
pub use registry::{PollCallbacks, PollingRegistry};
