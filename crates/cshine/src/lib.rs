pub mod api;
pub mod broadcast;
pub mod config;
pub mod context;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod http;
pub mod job;
pub mod pipeline;
pub mod playback;
pub mod polling;
pub mod session;
pub mod storage;

pub use api::{CreateJobRequest, CreatedJob, JobBackend};
pub use broadcast::{JobProgressBroadcaster, JobProgressEvent, Notice, NoticeLevel, Notifier};
pub use config::{load_config, ClientConfig, PollingConfig, ProgressConfig};
pub use context::AppContext;
pub use controller::{FlashRecorderController, MeetingUploadController, UploadViewState};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ClientError, ConfigError, NetworkErrorKind, Result};
pub use http::{ApiClient, RequestOptions};
pub use job::{JobId, JobKind, JobResult, JobStatus};
pub use pipeline::{JobMetadata, SubmitPipeline, SubmittedJob, UploadArtifact};
pub use playback::{PlaybackController, PlayerEvent};
pub use polling::{poll_job, PollCallbacks, PollingRegistry};
pub use session::{LoginCodeSource, Session};
pub use storage::{OssUploader, StorageUploader};
