//! Local credential storage.
//!
//! The backend issues a bearer token once at login. The token, the user id
//! and the cached user profile are persisted as opaque values under fixed
//! keys, with no schema versioning:
//!
//! - `cshine_token`
//! - `cshine_user_id`
//! - `cshine_user_info`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::Result;

pub const TOKEN_KEY: &str = "cshine_token";
pub const USER_ID_KEY: &str = "cshine_user_id";
pub const USER_INFO_KEY: &str = "cshine_user_info";

/// Host-local storage for the session credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn token(&self) -> Option<SecretString> {
        match self.get(TOKEN_KEY)? {
            Value::String(s) if !s.is_empty() => Some(SecretString::from(s)),
            _ => None,
        }
    }

    fn set_token(&self, token: &SecretString) -> Result<()> {
        self.set(
            TOKEN_KEY,
            Value::String(token.expose_secret().to_string()),
        )
    }

    fn user_id(&self) -> Option<String> {
        match self.get(USER_ID_KEY)? {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.set(USER_ID_KEY, Value::String(user_id.to_string()))
    }

    fn user_profile(&self) -> Option<Value> {
        self.get(USER_INFO_KEY).filter(|v| !v.is_null())
    }

    fn set_user_profile(&self, profile: Value) -> Result<()> {
        self.set(USER_INFO_KEY, profile)
    }

    /// Drops every cached credential. Used on logout and on HTTP 401.
    fn clear(&self) -> Result<()> {
        self.remove(TOKEN_KEY)?;
        self.remove(USER_ID_KEY)?;
        self.remove(USER_INFO_KEY)?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// JSON key/value file, rewritten in full on every change.
pub struct FileCredentialStore {
    path: PathBuf,
    values: Mutex<HashMap<String, Value>>,
}

impl FileCredentialStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(
                    "Credential store {:?} is corrupt ({}), starting empty",
                    path, e
                );
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read credential store {:?}: {}", path, e);
                HashMap::new()
            }
        };
        debug!("Opened credential store {:?} ({} keys)", path, values.len());

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
