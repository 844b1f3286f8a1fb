//! Direct upload of audio artifacts to object storage.

pub mod oss;

use async_trait::async_trait;

use crate::api::models::OssSignature;
use crate::error::Result;
use crate::pipeline::UploadArtifact;

pub use oss::OssUploader;

/// Receives raw transfer progress, 0-100.
pub trait UploadProgress: Send + Sync {
    fn on_progress(&self, percent: u8);
}

#[async_trait]
pub trait StorageUploader: Send + Sync {
    /// Uploads the artifact and returns its canonical object URL.
    async fn upload(
        &self,
        signature: &OssSignature,
        artifact: &UploadArtifact,
        progress: std::sync::Arc<dyn UploadProgress>,
    ) -> Result<String>;
}
