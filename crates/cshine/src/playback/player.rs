use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::waveform::{render, WaveformFrame};
use crate::broadcast::Notifier;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Seconds moved by one skip.
pub const SKIP_SECONDS: f64 = 15.0;

/// Speeds cycled by [`PlaybackController::cycle_speed`].
pub const SPEED_OPTIONS: [f32; 4] = [0.5, 1.0, 1.5, 2.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Ended,
}

/// Events raised by the host player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Play,
    Pause,
    Ended,
    TimeUpdate(f64),
    Error(String),
}

/// The host's audio player.
pub trait AudioBackend: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn seek(&self, seconds: f64);
    fn set_playback_rate(&self, rate: f32);
    fn current_time(&self) -> f64;
    /// Duration reported by the player, if it knows it yet.
    fn duration(&self) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub current_time: f64,
    /// Zero while unknown.
    pub duration: f64,
    pub is_playing: bool,
    pub playback_rate: f32,
    pub last_error: Option<String>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            playback_rate: 1.0,
            last_error: None,
        }
    }
}

fn apply_event(
    snapshot: &watch::Sender<PlaybackSnapshot>,
    notifier: Option<&Notifier>,
    event: PlayerEvent,
) {
    match event {
        PlayerEvent::Play => snapshot.send_modify(|s| {
            s.state = PlaybackState::Playing;
            s.is_playing = true;
        }),
        PlayerEvent::Pause => snapshot.send_modify(|s| {
            s.state = PlaybackState::Paused;
            s.is_playing = false;
        }),
        PlayerEvent::Ended => snapshot.send_modify(|s| {
            s.state = PlaybackState::Ended;
            s.is_playing = false;
            s.current_time = 0.0;
        }),
        PlayerEvent::TimeUpdate(t) => {
            if t.is_finite() {
                snapshot.send_modify(|s| s.current_time = t.max(0.0));
            }
        }
        PlayerEvent::Error(message) => {
            warn!(error = %message, "Audio playback error");
            if let Some(notifier) = notifier {
                notifier.error("Playback failed");
            }
            snapshot.send_modify(|s| s.last_error = Some(message));
        }
    }
}

/// Playback state for one audio track.
///
/// State changes follow the host's events; commands only drive the backend.
pub struct PlaybackController {
    backend: Arc<dyn AudioBackend>,
    declared_duration: Option<f64>,
    tick: Duration,
    snapshot: Arc<watch::Sender<PlaybackSnapshot>>,
    notifier: Option<Notifier>,
    attached: AtomicBool,
    cancel: CancellationToken,
}

impl PlaybackController {
    /// `declared_duration` is the duration known from the meeting record;
    /// it wins over whatever the player reports.
    pub fn new(backend: Arc<dyn AudioBackend>, declared_duration: Option<f64>, tick: Duration) -> Self {
        let declared_duration = declared_duration.filter(|d| d.is_finite() && *d > 0.0);
        let (snapshot, _) = watch::channel(PlaybackSnapshot {
            duration: declared_duration.unwrap_or(0.0),
            ..PlaybackSnapshot::default()
        });
        Self {
            backend,
            declared_duration,
            tick: tick.clamp(Duration::from_millis(100), Duration::from_millis(500)),
            snapshot: Arc::new(snapshot),
            notifier: None,
            attached: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Samples at the configured playback tick.
    pub fn from_config(
        backend: Arc<dyn AudioBackend>,
        declared_duration: Option<f64>,
        config: &ClientConfig,
    ) -> Self {
        Self::new(backend, declared_duration, config.playback_tick())
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Starts consuming host events and sampling the position.
    ///
    /// Allowed once per controller.
    pub fn attach(&self, mut events: mpsc::UnboundedReceiver<PlayerEvent>) -> Result<()> {
        if self.attached.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Validation(
                "player is already attached".to_string(),
            ));
        }

        let backend = Arc::clone(&self.backend);
        let snapshot = Arc::clone(&self.snapshot);
        let notifier = self.notifier.clone();
        let cancel = self.cancel.clone();
        let tick = self.tick;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let playing = snapshot.borrow().is_playing;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => apply_event(&snapshot, notifier.as_ref(), event),
                        None => break,
                    },
                    _ = ticker.tick(), if playing => {
                        let now = backend.current_time();
                        if now.is_finite() {
                            snapshot.send_modify(|s| s.current_time = now.max(0.0));
                        }
                    }
                }
            }
            debug!("Playback event loop stopped");
        });
        Ok(())
    }

    /// Applies one host event directly.
    pub fn handle_event(&self, event: PlayerEvent) {
        apply_event(&self.snapshot, self.notifier.as_ref(), event);
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Declared duration, else the player's, else unknown.
    pub fn duration(&self) -> Option<f64> {
        self.declared_duration.or_else(|| {
            self.backend
                .duration()
                .filter(|d| d.is_finite() && *d > 0.0)
        })
    }

    pub fn toggle(&self) {
        if self.snapshot.borrow().is_playing {
            self.backend.pause();
        } else {
            self.backend.play();
        }
    }

    /// Seeks, clamped to the track. Returns the position used.
    pub fn seek(&self, seconds: f64) -> f64 {
        let upper = self.duration().unwrap_or(f64::INFINITY);
        let target = if seconds.is_finite() {
            seconds.clamp(0.0, upper)
        } else {
            0.0
        };
        self.backend.seek(target);
        let duration = self.duration().unwrap_or(0.0);
        self.snapshot.send_modify(|s| {
            s.current_time = target;
            s.duration = duration;
        });
        target
    }

    pub fn skip_forward(&self) -> f64 {
        self.seek(self.backend.current_time() + SKIP_SECONDS)
    }

    pub fn skip_backward(&self) -> f64 {
        self.seek(self.backend.current_time() - SKIP_SECONDS)
    }

    /// Moves to the next speed option and returns it.
    pub fn cycle_speed(&self) -> f32 {
        let current = self.snapshot.borrow().playback_rate;
        let next = SPEED_OPTIONS
            .iter()
            .position(|r| (r - current).abs() < f32::EPSILON)
            .map_or(0, |i| (i + 1) % SPEED_OPTIONS.len());
        let rate = SPEED_OPTIONS[next];
        self.backend.set_playback_rate(rate);
        self.snapshot.send_modify(|s| s.playback_rate = rate);
        rate
    }

    /// Waveform layout at the current position.
    pub fn frame(&self, samples: &[f32], width: f32, height: f32) -> WaveformFrame {
        let current = self.snapshot.borrow().current_time;
        render(
            samples,
            current,
            self.duration().unwrap_or(0.0),
            width,
            height,
        )
    }

    pub fn detach(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
