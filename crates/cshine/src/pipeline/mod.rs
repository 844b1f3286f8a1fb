//! Upload and job-creation pipeline.

pub mod artifact;
pub mod progress;
pub mod submit;

pub use artifact::{ArtifactSource, UploadArtifact, ALLOWED_EXTENSIONS};
pub use progress::{
    BroadcastProgress, NoopProgress, ProgressEvent, ProgressRemapper, ProgressReporter,
    RemappedUploadProgress,
};
pub use submit::{JobMetadata, SubmitPipeline, SubmittedJob, FLASH_CONTENT_PLACEHOLDER};
