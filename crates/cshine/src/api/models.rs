//! Request and response bodies of the backend REST surface.
//!
//! Response types are lenient: optional fields default, timestamps stay
//! strings, and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::job::JobId;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub code: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Profile cached next to the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub subscription_tier: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Query for list endpoints. Page defaults to 1, page size to 20.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
    pub folder_id: Option<i64>,
    pub is_favorite: Option<bool>,
}

impl ListQuery {
    pub fn to_params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("page", Some(self.page.unwrap_or(1).to_string())),
            ("page_size", Some(self.page_size.unwrap_or(20).to_string())),
            ("category", self.category.clone()),
            ("folder_id", self.folder_id.map(|id| id.to_string())),
            ("is_favorite", self.is_favorite.map(|f| f.to_string())),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flash {
    pub id: JobId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_duration: Option<u32>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlashUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meeting {
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub meeting_date: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_duration: Option<u32>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub conversational_summary: Option<String>,
    #[serde(default)]
    pub mind_map: Option<String>,
    #[serde(default)]
    pub key_points: Option<Vec<Value>>,
    #[serde(default)]
    pub action_items: Option<Vec<Value>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyMeetingRequest {
    pub folder_id: Option<i64>,
}

/// Meeting waveform amplitudes, normalised to 0..1.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Waveform {
    #[serde(default)]
    pub waveform: Vec<f32>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakerMapRequest {
    pub speaker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerMapping {
    pub speaker_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub contact_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeakerList {
    #[serde(default = "Vec::new")]
    pub items: Vec<SpeakerMapping>,
}

/// Short-lived direct-upload credential for the object storage host.
#[derive(Debug, Clone, Deserialize)]
pub struct OssSignature {
    pub host: String,
    pub key: String,
    pub policy: String,
    #[serde(alias = "OSSAccessKeyId", alias = "access_id")]
    pub accessid: String,
    pub signature: String,
    #[serde(default)]
    pub expire: Option<i64>,
}

impl OssSignature {
    /// Canonical object URL, `host/key`.
    pub fn object_url(&self) -> String {
        format!(
            "{}/{}",
            self.host.trim_end_matches('/'),
            self.key.trim_start_matches('/')
        )
    }
}

/// Response of the backend-proxied audio upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAudio {
    pub file_url: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderList {
    #[serde(default = "Vec::new")]
    pub items: Vec<Folder>,
    /// Meetings not filed in any folder.
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_url_has_single_slash() {
        let sig: OssSignature = serde_json::from_value(json!({
            "host": "https://bucket.oss.example.com/",
            "key": "/audio/2024/a.m4a",
            "policy": "p",
            "accessid": "id",
            "signature": "s"
        }))
        .unwrap();
        assert_eq!(
            sig.object_url(),
            "https://bucket.oss.example.com/audio/2024/a.m4a"
        );
    }

    #[test]
    fn test_list_query_defaults() {
        let params = ListQuery::default().to_params();
        assert_eq!(params[0], ("page", Some("1".to_string())));
        assert_eq!(params[1], ("page_size", Some("20".to_string())));
        assert!(params[2..].iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = FlashUpdate {
            title: Some("Groceries".to_string()),
            ..FlashUpdate::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"title": "Groceries"}));
    }

    #[test]
    fn test_meeting_tolerates_sparse_payload() {
        let meeting: Meeting =
            serde_json::from_value(json!({"id": "m-1", "status": "processing"})).unwrap();
        assert_eq!(meeting.id.as_str(), "m-1");
        assert!(meeting.transcript.is_none());
        assert!(!meeting.is_favorite);
    }
}
