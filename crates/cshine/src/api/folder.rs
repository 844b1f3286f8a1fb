use serde_json::Value;

use crate::api::models::{Folder, FolderList, FolderRequest};
use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};

const FOLDERS: &str = "/api/v1/folders";

impl ApiClient {
    pub async fn create_folder(&self, name: &str) -> Result<Folder> {
        self.post(
            FOLDERS,
            &FolderRequest {
                name: name.to_string(),
            },
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn list_folders(&self) -> Result<FolderList> {
        self.get(FOLDERS, &[], &RequestOptions::default()).await
    }

    pub async fn update_folder(&self, folder_id: i64, name: &str) -> Result<Folder> {
        self.put(
            &format!("{}/{}", FOLDERS, folder_id),
            Some(&FolderRequest {
                name: name.to_string(),
            }),
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn delete_folder(&self, folder_id: i64) -> Result<()> {
        let _: Value = self
            .delete(
                &format!("{}/{}", FOLDERS, folder_id),
                &RequestOptions::default(),
            )
            .await?;
        Ok(())
    }
}
