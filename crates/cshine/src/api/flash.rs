use serde_json::Value;

use crate::api::backend::CreateJobRequest;
use crate::api::models::{Flash, FlashUpdate, ListQuery, Page};
use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};
use crate::job::{JobId, JobKind, StatusReport};

const FLASH_BASE: &str = "/api/v1/flash";

fn flash_path(id: &JobId) -> String {
    format!("{}/{}", FLASH_BASE, id)
}

impl ApiClient {
    pub async fn create_flash(&self, request: &CreateJobRequest) -> Result<Flash> {
        self.post(
            JobKind::Flash.create_path(),
            request,
            &RequestOptions::with_loading("Saving..."),
        )
        .await
    }

    pub async fn list_flashes(&self, query: &ListQuery) -> Result<Page<Flash>> {
        self.get(
            &format!("{}/list", FLASH_BASE),
            &query.to_params(),
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn flash_detail(&self, id: &JobId) -> Result<Flash> {
        self.get(&flash_path(id), &[], &RequestOptions::default())
            .await
    }

    pub async fn update_flash(&self, id: &JobId, update: &FlashUpdate) -> Result<Flash> {
        self.put(&flash_path(id), Some(update), &RequestOptions::default())
            .await
    }

    pub async fn delete_flash(&self, id: &JobId) -> Result<()> {
        let _: Value = self
            .delete(&flash_path(id), &RequestOptions::default())
            .await?;
        Ok(())
    }

    pub async fn toggle_flash_favorite(&self, id: &JobId) -> Result<Value> {
        self.put::<Value, Value>(
            &format!("{}/favorite", flash_path(id)),
            None,
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn flash_ai_status(&self, id: &JobId) -> Result<StatusReport> {
        self.get(
            &JobKind::Flash.status_path(id),
            &[],
            &RequestOptions::default(),
        )
        .await
    }
}
