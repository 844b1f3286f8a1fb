//! Process-wide application state.

use std::sync::Arc;

use log::info;

use crate::api::JobBackend;
use crate::broadcast::{JobProgressBroadcaster, Notifier};
use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::error::Result;
use crate::http::ApiClient;
use crate::pipeline::SubmitPipeline;
use crate::playback::{AudioBackend, PlaybackController};
use crate::polling::PollingRegistry;
use crate::session::Session;
use crate::storage::{OssUploader, StorageUploader};

/// Everything that lives as long as the application.
///
/// Flash notes are tracked in `flash_registry`, which outlives any page.
/// Pages that own their polling get a fresh registry from
/// [`AppContext::page_registry`].
pub struct AppContext {
    config: ClientConfig,
    client: ApiClient,
    backend: Arc<dyn JobBackend>,
    uploader: Arc<dyn StorageUploader>,
    notifier: Notifier,
    progress: JobProgressBroadcaster,
    flash_registry: Arc<PollingRegistry>,
}

impl AppContext {
    /// Wires the real HTTP backend and storage uploader.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let credentials: Arc<dyn CredentialStore> = match config.storage_file() {
            Some(path) => {
                info!("Using credential store at {}", path.display());
                Arc::new(FileCredentialStore::open(path))
            }
            None => Arc::new(MemoryCredentialStore::new()),
        };
        let client = ApiClient::new(&config, credentials)?;
        let uploader = Arc::new(OssUploader::new(client.http().clone()));
        let backend: Arc<dyn JobBackend> = Arc::new(client.clone());
        Ok(Self::with_parts(config, client, backend, uploader))
    }

    /// Wires arbitrary backends, e.g. scripted ones in tests.
    pub fn with_parts(
        config: ClientConfig,
        client: ApiClient,
        backend: Arc<dyn JobBackend>,
        uploader: Arc<dyn StorageUploader>,
    ) -> Self {
        let notifier = Notifier::default();
        let progress = JobProgressBroadcaster::default();
        let flash_registry = Arc::new(
            PollingRegistry::from_config(Arc::clone(&backend), &config)
                .with_notifier(notifier.clone())
                .with_progress(progress.clone()),
        );
        Self {
            config,
            client,
            backend,
            uploader,
            notifier,
            progress,
            flash_registry,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn backend(&self) -> &Arc<dyn JobBackend> {
        &self.backend
    }

    pub fn session(&self) -> Session {
        Session::new(self.client.clone())
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn progress(&self) -> &JobProgressBroadcaster {
        &self.progress
    }

    /// The application-wide registry for flash note polling.
    pub fn flash_registry(&self) -> Arc<PollingRegistry> {
        Arc::clone(&self.flash_registry)
    }

    /// A new registry owned by the caller; dropping it stops its polls.
    pub fn page_registry(&self) -> PollingRegistry {
        PollingRegistry::from_config(Arc::clone(&self.backend), &self.config)
            .with_notifier(self.notifier.clone())
            .with_progress(self.progress.clone())
    }

    /// Playback for one track, sampled at the configured tick and reporting
    /// player errors on the notifier.
    pub fn playback(
        &self,
        backend: Arc<dyn AudioBackend>,
        declared_duration: Option<f64>,
    ) -> PlaybackController {
        PlaybackController::from_config(backend, declared_duration, &self.config)
            .with_notifier(self.notifier.clone())
    }

    pub fn pipeline(&self) -> SubmitPipeline {
        SubmitPipeline::from_config(
            Arc::clone(&self.backend),
            Arc::clone(&self.uploader),
            &self.config,
        )
    }
}
