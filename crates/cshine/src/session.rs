//! Login state on top of the credential store.

use async_trait::async_trait;
use log::{info, warn};
use secrecy::SecretString;

use crate::api::models::{LoginRequest, LoginResponse, UserProfile};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;

/// Host facility issuing one-time login codes.
#[async_trait]
pub trait LoginCodeSource: Send + Sync {
    async fn login_code(&self) -> Result<String>;
}

/// A code obtained out of band, e.g. passed on the command line.
pub struct StaticLoginCode(pub String);

#[async_trait]
impl LoginCodeSource for StaticLoginCode {
    async fn login_code(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub struct Session {
    client: ApiClient,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Token and user id are both cached.
    pub fn is_logged_in(&self) -> bool {
        let store = self.client.credentials();
        store.token().is_some() && store.user_id().is_some()
    }

    pub async fn login(
        &self,
        codes: &dyn LoginCodeSource,
        profile: Option<UserProfile>,
    ) -> Result<LoginResponse> {
        let code = codes.login_code().await?;
        if code.trim().is_empty() {
            return Err(ClientError::Validation("Failed to obtain login code".to_string()));
        }

        let profile = profile.unwrap_or_default();
        let request = LoginRequest {
            code,
            nickname: profile.nickname.clone(),
            avatar: profile.avatar.clone(),
        };
        let response = self.client.login(&request).await?;

        let store = self.client.credentials();
        store.set_token(&SecretString::from(response.token.clone()))?;
        store.set_user_id(&response.user_id)?;
        store.set_user_profile(serde_json::to_value(&profile)?)?;

        info!(
            "Logged in as user {}{}",
            response.user_id,
            if response.is_new_user { " (new)" } else { "" }
        );
        Ok(response)
    }

    /// Logs in only when no session is cached.
    pub async fn ensure_login(&self, codes: &dyn LoginCodeSource) -> Result<()> {
        if self.is_logged_in() {
            return Ok(());
        }
        self.login(codes, None).await.map(|_| ())
    }

    pub fn logout(&self) -> Result<()> {
        if let Err(e) = self.client.credentials().clear() {
            warn!("Failed to clear credentials on logout: {}", e);
            return Err(e);
        }
        info!("Logged out");
        Ok(())
    }
}
