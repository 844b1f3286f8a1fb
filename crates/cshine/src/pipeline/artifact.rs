use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

/// Extensions accepted for files picked from disk.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "aac"];

const DEFAULT_MIME: &str = "audio/mpeg";

/// Where the audio came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Produced by the recorder; trusted format.
    Recording,
    /// Chosen by the user from the file system.
    Picked,
}

/// Local audio file about to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadArtifact {
    path: PathBuf,
    size: u64,
    duration_secs: Option<u32>,
    mime_type: String,
    source: ArtifactSource,
}

impl UploadArtifact {
    pub fn new(path: impl Into<PathBuf>, size: u64, duration_secs: Option<u32>, source: ArtifactSource) -> Self {
        let path = path.into();
        let mime_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_MIME.to_string());
        Self {
            path,
            size,
            duration_secs,
            mime_type,
            source,
        }
    }

    /// Artifact for a finished recording, size read from disk.
    pub async fn from_recording(path: impl Into<PathBuf>, duration_secs: Option<u32>) -> Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self::new(path, size, duration_secs, ArtifactSource::Recording))
    }

    /// Artifact for a user-picked file, size read from disk.
    pub async fn from_picked_file(path: impl Into<PathBuf>, duration_secs: Option<u32>) -> Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self::new(path, size, duration_secs, ArtifactSource::Picked))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source(&self) -> ArtifactSource {
        self.source
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string())
    }

    fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Local preconditions, checked before any network call.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        if self.size == 0 {
            return Err(ClientError::Validation("Audio file is empty".to_string()));
        }
        if self.size > max_bytes {
            return Err(ClientError::Validation(format!(
                "File size cannot exceed {}",
                format_size(max_bytes)
            )));
        }
        if self.source == ArtifactSource::Picked {
            let ext = self.extension().unwrap_or_default();
            if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(ClientError::Validation(format!(
                    "Unsupported audio format, use one of: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Whole units where exact, one decimal otherwise; bytes below 1 KB.
fn format_size(bytes: u64) -> String {
    let scaled = |unit: u64, suffix: &str| {
        if bytes % unit == 0 {
            format!("{}{}", bytes / unit, suffix)
        } else {
            format!("{:.1}{}", bytes as f64 / unit as f64, suffix)
        }
    };
    if bytes >= MIB {
        scaled(MIB, "MB")
    } else if bytes >= KIB {
        scaled(KIB, "KB")
    } else {
        format!("{} bytes", bytes)
    }
}
