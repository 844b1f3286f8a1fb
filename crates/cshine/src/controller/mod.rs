//! Page controllers: the state machines behind the upload and recorder pages.

pub mod flash_recorder;
pub mod meeting_upload;

pub use flash_recorder::{FlashRecorderController, FlashRefresh};
pub use meeting_upload::{MeetingUploadController, UploadStatus, UploadViewState};
