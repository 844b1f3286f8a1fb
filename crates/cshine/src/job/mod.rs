//! Backend-tracked asynchronous jobs (flash notes and meetings).

pub mod status;

pub use status::{JobId, JobKind, JobResult, JobStatus, StatusReport};
