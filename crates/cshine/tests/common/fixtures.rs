#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::broadcast;

use cshine::api::JobBackend;
use cshine::broadcast::Notice;
use cshine::config::{ClientConfig, PollingConfig};
use cshine::credentials::MemoryCredentialStore;
use cshine::http::ApiClient;
use cshine::pipeline::{ArtifactSource, ProgressEvent, ProgressReporter, UploadArtifact};
use cshine::storage::StorageUploader;
use cshine::AppContext;

/// 500 ms initial delay, 2 s interval, `max_attempts` checks.
pub fn polling(max_attempts: u32) -> PollingConfig {
    PollingConfig::new(Duration::from_millis(500), Duration::from_secs(2), max_attempts)
}

pub fn config(max_attempts: u32) -> ClientConfig {
    ClientConfig {
        flash_polling: polling(max_attempts),
        meeting_polling: polling(max_attempts),
        ..ClientConfig::default()
    }
}

/// A recording of `size` bytes; the mock uploader never opens it.
pub fn artifact(size: u64) -> UploadArtifact {
    UploadArtifact::new("/tmp/rec.m4a", size, Some(42), ArtifactSource::Recording)
}

/// Context wired to scripted parts. The HTTP client points nowhere.
pub fn context(
    backend: Arc<dyn JobBackend>,
    uploader: Arc<dyn StorageUploader>,
    config: ClientConfig,
) -> AppContext {
    let client = ApiClient::with_http_client(
        Client::new(),
        "http://127.0.0.1:9",
        Arc::new(MemoryCredentialStore::with_token("test-token")),
    );
    AppContext::with_parts(config, client, backend, uploader)
}

/// Collects every pipeline progress event.
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn values(&self) -> Vec<u8> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Phase { progress, .. } => Some(*progress),
                ProgressEvent::Created { progress, .. } => Some(*progress),
                ProgressEvent::Failed { .. } => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Failed { .. }))
            .count()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Drains whatever notices are queued.
pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
