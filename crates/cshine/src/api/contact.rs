use serde_json::Value;

use crate::api::models::{Contact, ContactRequest, Page};
use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};

const CONTACTS: &str = "/api/v1/contacts";

impl ApiClient {
    pub async fn create_contact(&self, request: &ContactRequest) -> Result<Contact> {
        self.post(
            &format!("{}/create", CONTACTS),
            request,
            &RequestOptions::with_loading("Saving..."),
        )
        .await
    }

    pub async fn list_contacts(&self) -> Result<Page<Contact>> {
        self.get(
            &format!("{}/list", CONTACTS),
            &[],
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn contact_detail(&self, contact_id: i64) -> Result<Contact> {
        self.get(
            &format!("{}/{}", CONTACTS, contact_id),
            &[],
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn update_contact(&self, contact_id: i64, request: &ContactRequest) -> Result<Contact> {
        self.put(
            &format!("{}/{}", CONTACTS, contact_id),
            Some(request),
            &RequestOptions::with_loading("Saving..."),
        )
        .await
    }

    pub async fn delete_contact(&self, contact_id: i64) -> Result<()> {
        let _: Value = self
            .delete(
                &format!("{}/{}", CONTACTS, contact_id),
                &RequestOptions::with_loading("Deleting..."),
            )
            .await?;
        Ok(())
    }
}
