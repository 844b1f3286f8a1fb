use crate::api::models::{LoginRequest, LoginResponse, User};
use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};

const AUTH_LOGIN: &str = "/api/v1/auth/login";
const AUTH_ME: &str = "/api/v1/auth/me";

impl ApiClient {
    /// Exchanges a host-issued one-time code for a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.post(AUTH_LOGIN, request, &RequestOptions::public())
            .await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get(AUTH_ME, &[], &RequestOptions::default()).await
    }
}
