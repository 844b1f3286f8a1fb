use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::envelope::{decode_response, sanitize_error_body};
use super::loading::{LoadingGuard, LoadingIndicator, NoopLoading};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::{ClientError, Result};

/// Creates an HTTP client with appropriate timeouts.
pub fn create_http_client(connect_timeout: Duration, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ClientError::Validation(format!("Failed to create HTTP client: {}", e)))
}

/// Per-call flags.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Attach the cached bearer token.
    pub need_auth: bool,
    /// Show the global loading indicator while the call is in flight.
    pub show_load: bool,
    pub loading_text: String,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            need_auth: true,
            show_load: false,
            loading_text: "Loading...".to_string(),
        }
    }
}

impl RequestOptions {
    /// Unauthenticated call, e.g. login.
    pub fn public() -> Self {
        Self {
            need_auth: false,
            ..Self::default()
        }
    }

    pub fn with_loading(text: &str) -> Self {
        Self {
            show_load: true,
            loading_text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Backend REST client.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    loading: Arc<dyn LoadingIndicator>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = create_http_client(config.connect_timeout(), config.request_timeout())?;
        Ok(Self::with_http_client(
            http,
            &config.api_base_url,
            credentials,
        ))
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            loading: Arc::new(NoopLoading),
        }
    }

    /// Replaces the loading indicator.
    pub fn with_loading_indicator(mut self, loading: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = loading;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying HTTP client, shared with direct storage uploads.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Sends one request and decodes the envelope.
    ///
    /// Query entries whose value is `None` are dropped.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, Option<String>)],
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        let params: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
            .collect();
        if !params.is_empty() {
            builder = builder.query(&params);
        }

        builder = self.authorize(builder, options.need_auth);

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let _loading = options
            .show_load
            .then(|| LoadingGuard::new(Arc::clone(&self.loading), &options.loading_text));

        let response = builder.send().await.map_err(|e| {
            error!("[API Error] {} {}: {}", method, path, e);
            ClientError::from(e)
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            error!("[API Error] {} {}: failed to read body: {}", method, path, e);
            ClientError::from(e)
        })?;
        debug!("[API] {} {} -> {}", method, path, status);

        self.finish(status, &bytes, &method, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, Option<String>)],
        options: &RequestOptions,
    ) -> Result<T> {
        self.request(Method::GET, path, query, None, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, &[], Some(body), options)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T> {
        let body = body.map(serde_json::to_value).transpose()?;
        self.request(Method::PUT, path, &[], body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T> {
        self.request(Method::DELETE, path, &[], None, options).await
    }

    /// Multipart upload of a local file through the backend (`file` part).
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file_path: &Path,
        options: &RequestOptions,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let builder = self.authorize(self.http.post(&url).multipart(form), options.need_auth);

        let _loading = options
            .show_load
            .then(|| LoadingGuard::new(Arc::clone(&self.loading), &options.loading_text));

        let response = builder.send().await.map_err(|e| {
            error!("[API Error] POST {} (upload): {}", path, e);
            ClientError::from(e)
        })?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(ClientError::from)?;

        self.finish(status, &bytes, &Method::POST, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder, need_auth: bool) -> reqwest::RequestBuilder {
        if !need_auth {
            return builder;
        }
        match self.credentials.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => {
                warn!("No token cached, sending request without Authorization; login may be required");
                builder
            }
        }
    }

    fn finish<T: DeserializeOwned>(
        &self,
        status: u16,
        body: &[u8],
        method: &Method,
        path: &str,
    ) -> Result<T> {
        match decode_response(status, body) {
            Ok(value) => Ok(value),
            Err(ClientError::AuthExpired) => {
                warn!("Token expired on {} {}, clearing cached credentials", method, path);
                if let Err(e) = self.credentials.clear() {
                    error!("Failed to clear credentials: {}", e);
                }
                Err(ClientError::AuthExpired)
            }
            Err(err) => {
                warn!(
                    "[API] {} {} failed ({}): {} | body: {}",
                    method,
                    path,
                    status,
                    err,
                    sanitize_error_body(&String::from_utf8_lossy(body))
                );
                Err(err)
            }
        }
    }
}
