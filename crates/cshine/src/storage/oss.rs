use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tokio_util::io::ReaderStream;

use super::{StorageUploader, UploadProgress};
use crate::api::models::OssSignature;
use crate::error::{ClientError, Result};
use crate::pipeline::UploadArtifact;

/// Raw transfer percentage, clamped to 0-100.
pub fn transfer_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (sent.saturating_mul(100) / total).min(100) as u8
}

/// Posts a signed multipart form straight to the storage host.
#[derive(Clone)]
pub struct OssUploader {
    http: Client,
}

impl OssUploader {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn signed_form(signature: &OssSignature, file: Part) -> Form {
        // The file part must come last
        Form::new()
            .text("key", signature.key.clone())
            .text("policy", signature.policy.clone())
            .text("OSSAccessKeyId", signature.accessid.clone())
            .text("signature", signature.signature.clone())
            .text("success_action_status", "200")
            .part("file", file)
    }
}

#[async_trait]
impl StorageUploader for OssUploader {
    async fn upload(
        &self,
        signature: &OssSignature,
        artifact: &UploadArtifact,
        progress: Arc<dyn UploadProgress>,
    ) -> Result<String> {
        let file = tokio::fs::File::open(artifact.path()).await?;
        let total = artifact.size();
        let sent = Arc::new(AtomicU64::new(0));

        let reporter = Arc::clone(&progress);
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                let now = sent.fetch_add(bytes.len() as u64, Ordering::Relaxed) + bytes.len() as u64;
                reporter.on_progress(transfer_percent(now, total));
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(artifact.file_name())
            .mime_str(artifact.mime_type())
            .map_err(ClientError::from)?;

        debug!(
            "Uploading {} ({} bytes) to {}",
            artifact.file_name(),
            total,
            signature.host
        );

        let response = self
            .http
            .post(&signature.host)
            .multipart(Self::signed_form(signature, part))
            .send()
            .await
            .map_err(|e| {
                error!("Storage upload of {} failed: {}", artifact.file_name(), e);
                ClientError::from(e)
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            error!("Storage upload rejected with status {}", status);
            return Err(ClientError::api(status, format!("upload failed: {}", status)));
        }

        progress.on_progress(100);
        Ok(signature.object_url())
    }
}
