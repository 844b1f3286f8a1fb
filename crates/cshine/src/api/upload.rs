use std::path::Path;

use crate::api::models::{OssSignature, UploadedAudio};
use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};

const UPLOAD_OSS_SIGNATURE: &str = "/api/v1/upload/oss-signature";
const UPLOAD_AUDIO: &str = "/api/v1/upload/audio";

impl ApiClient {
    /// Requests a short-lived direct-upload credential.
    pub async fn oss_signature(&self) -> Result<OssSignature> {
        self.get(UPLOAD_OSS_SIGNATURE, &[], &RequestOptions::default())
            .await
    }

    /// Uploads audio through the backend instead of directly to storage.
    pub async fn upload_audio(&self, file_path: &Path) -> Result<UploadedAudio> {
        self.upload_file(UPLOAD_AUDIO, file_path, &RequestOptions::default())
            .await
    }
}
