use serde_json::Value;

use crate::api::backend::CreateJobRequest;
use crate::api::models::{
    CopyMeetingRequest, ListQuery, Meeting, MeetingUpdate, Page, SpeakerList, SpeakerMapRequest,
    Waveform,
};
use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};
use crate::job::{JobId, JobKind, StatusReport};

const MEETING_BASE: &str = "/api/v1/meeting";

fn meeting_path(id: &JobId) -> String {
    format!("{}/{}", MEETING_BASE, id)
}

impl ApiClient {
    // The upload page drives its own progress display, so no loading indicator.
    pub async fn create_meeting(&self, request: &CreateJobRequest) -> Result<Meeting> {
        self.post(
            JobKind::Meeting.create_path(),
            request,
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn list_meetings(&self, query: &ListQuery) -> Result<Page<Meeting>> {
        self.get(
            &format!("{}/list", MEETING_BASE),
            &query.to_params(),
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn meeting_detail(&self, id: &JobId) -> Result<Meeting> {
        self.get(&meeting_path(id), &[], &RequestOptions::default())
            .await
    }

    pub async fn update_meeting(&self, id: &JobId, update: &MeetingUpdate) -> Result<Meeting> {
        self.put(&meeting_path(id), Some(update), &RequestOptions::default())
            .await
    }

    /// Copies a meeting into another folder (`None` for uncategorized).
    pub async fn copy_meeting(&self, id: &JobId, folder_id: Option<i64>) -> Result<Meeting> {
        self.post(
            &format!("{}/copy", meeting_path(id)),
            &CopyMeetingRequest { folder_id },
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn delete_meeting(&self, id: &JobId) -> Result<()> {
        let _: Value = self
            .delete(&meeting_path(id), &RequestOptions::default())
            .await?;
        Ok(())
    }

    pub async fn meeting_status(&self, id: &JobId) -> Result<StatusReport> {
        self.get(
            &JobKind::Meeting.status_path(id),
            &[],
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn toggle_meeting_favorite(&self, id: &JobId) -> Result<Value> {
        self.put::<Value, Value>(
            &format!("{}/favorite", meeting_path(id)),
            None,
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn meeting_waveform(&self, id: &JobId) -> Result<Waveform> {
        self.get(
            &format!("{}/waveform", meeting_path(id)),
            &[],
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn map_speaker(&self, id: &JobId, request: &SpeakerMapRequest) -> Result<Value> {
        self.post(
            &format!("{}/speakers/map", meeting_path(id)),
            request,
            &RequestOptions::with_loading("Saving..."),
        )
        .await
    }

    pub async fn meeting_speakers(&self, id: &JobId) -> Result<SpeakerList> {
        self.get(
            &format!("{}/speakers", meeting_path(id)),
            &[],
            &RequestOptions::default(),
        )
        .await
    }
}
