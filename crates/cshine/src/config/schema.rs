use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upload size ceiling enforced before any network call (500 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default = "PollingConfig::flash")]
    pub flash_polling: PollingConfig,
    #[serde(default = "PollingConfig::meeting")]
    pub meeting_polling: PollingConfig,
    #[serde(default = "default_playback_tick_ms")]
    pub playback_tick_ms: u64,
    /// Location of the local credential store. Defaults to the platform config dir.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_playback_tick_ms() -> u64 {
    200
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            progress: ProgressConfig::default(),
            flash_polling: PollingConfig::flash(),
            meeting_polling: PollingConfig::meeting(),
            playback_tick_ms: default_playback_tick_ms(),
            storage_path: None,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sampling tick for playback progress, kept within 100..=500 ms.
    pub fn playback_tick(&self) -> Duration {
        Duration::from_millis(self.playback_tick_ms.clamp(100, 500))
    }

    /// Resolved credential store path.
    pub fn storage_file(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join("cshine").join("storage.json")))
    }
}

/// Presentation ranges for the 0-100 progress bar.
///
/// These are UI conventions, not backend guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressConfig {
    #[serde(default)]
    pub upload_start: u8,
    #[serde(default = "default_upload_end")]
    pub upload_end: u8,
    #[serde(default = "default_created")]
    pub created: u8,
}

fn default_upload_end() -> u8 {
    30
}

fn default_created() -> u8 {
    50
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            upload_start: 0,
            upload_end: default_upload_end(),
            created: default_created(),
        }
    }
}

/// Timing and budget for one status-polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingConfig {
    /// Delay before the first status check, so the new job is registered server-side.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    90
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self::flash()
    }
}

impl PollingConfig {
    /// Flash notes: 2 s interval, 90 attempts (about three minutes).
    pub fn flash() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }

    /// Meetings take longer to process: 5 s interval, same attempt budget.
    pub fn meeting() -> Self {
        Self {
            interval_ms: 5000,
            ..Self::flash()
        }
    }

    pub fn new(initial_delay: Duration, interval: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay_ms: initial_delay.as_millis() as u64,
            interval_ms: interval.as_millis() as u64,
            max_attempts,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
