use std::path::{Path, PathBuf};

use log::info;

use crate::config::schema::{ClientConfig, PollingConfig};
use crate::error::ConfigError;

/// Path of a JSON config file to load when none is given explicitly.
pub const CONFIG_PATH_ENV: &str = "CSHINE_CONFIG";
/// Overrides `apiBaseUrl` from any source.
pub const API_BASE_URL_ENV: &str = "CSHINE_API_BASE_URL";

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Loads the effective configuration.
///
/// Source order: `explicit` path, then `CSHINE_CONFIG`, then built-in
/// defaults. `CSHINE_API_BASE_URL` is applied last.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&content)?
        }
        None => ClientConfig::default(),
    };

    if let Some(base_url) = env_value(API_BASE_URL_ENV) {
        info!("Using API base URL from {}", API_BASE_URL_ENV);
        config.api_base_url = base_url;
    }

    validate_config(&config)?;
    Ok(config)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let base = config.api_base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!(
                "apiBaseUrl must start with http:// or https://, got '{}'",
                config.api_base_url
            ),
        });
    }

    if config.max_upload_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "maxUploadBytes must be greater than zero".to_string(),
        });
    }

    let progress = &config.progress;
    if progress.upload_start > progress.upload_end
        || progress.upload_end > progress.created
        || progress.created > 100
    {
        return Err(ConfigError::Validation {
            message: format!(
                "progress ranges must satisfy uploadStart <= uploadEnd <= created <= 100 (got {} / {} / {})",
                progress.upload_start, progress.upload_end, progress.created
            ),
        });
    }

    validate_polling("flashPolling", &config.flash_polling)?;
    validate_polling("meetingPolling", &config.meeting_polling)?;

    Ok(())
}

fn validate_polling(name: &str, polling: &PollingConfig) -> Result<(), ConfigError> {
    if polling.max_attempts == 0 {
        return Err(ConfigError::Validation {
            message: format!("{}.maxAttempts must be at least 1", name),
        });
    }
    if polling.interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: format!("{}.intervalMs must be greater than zero", name),
        });
    }
    Ok(())
}
