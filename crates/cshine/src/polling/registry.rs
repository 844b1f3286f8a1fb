use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::engine::{poll_job_observed, TickFn};
use crate::api::JobBackend;
use crate::broadcast::{JobProgressBroadcaster, Notifier};
use crate::config::{ClientConfig, PollingConfig};
use crate::error::ClientError;
use crate::job::{JobId, JobKind, JobResult, StatusReport};

type DoneFn = Box<dyn FnOnce(JobResult) + Send>;
type ErrorFn = Box<dyn FnOnce(ClientError) + Send>;

/// Callbacks for one polling handle.
///
/// `on_done` and `on_error` fire at most once. `on_tick` sees every status
/// report of the handle while it is still current.
#[derive(Default)]
pub struct PollCallbacks {
    on_done: Option<DoneFn>,
    on_error: Option<ErrorFn>,
    on_tick: Option<Box<TickFn>>,
}

impl PollCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_done(mut self, f: impl FnOnce(JobResult) + Send + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(ClientError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_tick(mut self, f: impl FnMut(&StatusReport) + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }

    fn finish(self, outcome: crate::error::Result<JobResult>) {
        match outcome {
            Ok(result) => {
                if let Some(f) = self.on_done {
                    f(result);
                }
            }
            Err(e) => {
                if let Some(f) = self.on_error {
                    f(e);
                }
            }
        }
    }
}

struct Handle {
    token: CancellationToken,
    generation: u64,
}

type HandleMap = Arc<Mutex<HashMap<JobId, Handle>>>;

/// Owns the active polling handles of one scope.
///
/// At most one handle per job id. Dropping the registry cancels everything
/// it still owns.
pub struct PollingRegistry {
    backend: Arc<dyn JobBackend>,
    flash: PollingConfig,
    meeting: PollingConfig,
    notifier: Option<Notifier>,
    progress: Option<JobProgressBroadcaster>,
    handles: HandleMap,
    next_generation: AtomicU64,
}

impl PollingRegistry {
    pub fn new(backend: Arc<dyn JobBackend>, flash: PollingConfig, meeting: PollingConfig) -> Self {
        Self {
            backend,
            flash,
            meeting,
            notifier: None,
            progress: None,
            handles: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(backend: Arc<dyn JobBackend>, config: &ClientConfig) -> Self {
        Self::new(backend, config.flash_polling, config.meeting_polling)
    }

    /// Announces completed jobs on this notifier.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Broadcasts one progress event per status check.
    pub fn with_progress(mut self, progress: JobProgressBroadcaster) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config_for(&self, kind: JobKind) -> &PollingConfig {
        match kind {
            JobKind::Flash => &self.flash,
            JobKind::Meeting => &self.meeting,
        }
    }

    /// Starts polling `id`, replacing any handle already running for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, kind: JobKind, id: JobId, callbacks: PollCallbacks) {
        let token = CancellationToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;

        {
            let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
            let replaced = handles.insert(
                id.clone(),
                Handle {
                    token: token.clone(),
                    generation,
                },
            );
            if let Some(old) = replaced {
                debug!(job_id = %id, "Replacing active polling handle");
                old.token.cancel();
            }
        }

        let backend = Arc::clone(&self.backend);
        let config = *self.config_for(kind);
        let handles = Arc::clone(&self.handles);
        let notifier = self.notifier.clone();
        let progress = self.progress.clone();

        tokio::spawn(async move {
            let mut callbacks = callbacks;
            let mut on_tick = callbacks.on_tick.take();
            let outcome = poll_job_observed(
                backend.as_ref(),
                kind,
                &id,
                &config,
                &token,
                progress.as_ref(),
                on_tick.as_deref_mut(),
            )
            .await;

            if matches!(outcome, Err(ClientError::Cancelled)) {
                debug!(job_id = %id, "Polling cancelled");
                return;
            }

            {
                let mut map = handles.lock().unwrap_or_else(|e| e.into_inner());
                // Only the current generation may settle; a replaced or
                // cancelled handle stays silent.
                let current = map.get(&id).map(|h| h.generation) == Some(generation);
                if !current || token.is_cancelled() {
                    return;
                }
                map.remove(&id);
            }

            if outcome.is_ok() {
                info!(job_id = %id, kind = %kind, "Job finished");
                if let Some(notifier) = &notifier {
                    notifier.success(completion_message(kind));
                }
            }
            callbacks.finish(outcome);
        });
    }

    /// Cancels polling for `id`. No-op for unknown or finished ids.
    pub fn cancel(&self, id: &JobId) {
        let removed = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        if let Some(handle) = removed {
            debug!(job_id = %id, "Cancelling polling");
            handle.token.cancel();
        }
    }

    pub fn cancel_all(&self) {
        let drained: Vec<Handle> = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "Cancelling all polling handles");
        }
        for handle in drained {
            handle.token.cancel();
        }
    }

    pub fn is_active(&self, id: &JobId) -> bool {
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.handles.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for PollingRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn completion_message(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Flash => "AI processing completed",
        JobKind::Meeting => "Meeting processing completed",
    }
}
