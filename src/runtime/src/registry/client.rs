//! HTTP implementation of [`RegistryApi`].

use std::time::Duration;

use async_trait::async_trait;
use boxpub_core::config::ApiConfig;
use boxpub_core::error::{PublishError, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use urlencoding::encode;

use super::coordinates::OPERATION_PREFIX;
use super::models::{
    ArchitectureRecord, BoxRecord, CreateBoxResponse, DirectUploadTicket, OperationLocation,
    ProviderRecord, StatusPayload, UploadTicket, VersionRecord, VersionResponse, WaitResponse,
};
use super::{auth, ApiError, ApiResult, BoxCoordinates, RegistryApi};

/// Registry client speaking JSON over HTTPS.
pub struct HttpRegistryClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRegistryClient {
    /// Build a client and, when credentials are configured, obtain a token.
    pub async fn connect(api: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(api.insecure_skip_tls_verify)
            .build()
            .map_err(|e| {
                PublishError::UnexpectedClientError(format!("Failed to build HTTP client: {}", e))
            })?;

        let token = match api.credentials() {
            Some((id, secret)) => Some(auth::fetch_token(&http, &api.auth_url, id, secret).await?),
            None => {
                tracing::debug!("No client credentials configured, sending unauthenticated requests");
                None
            }
        };

        Ok(Self::with_parts(http, api.base_url(), token))
    }

    /// Assemble a client from an existing HTTP client and bearer token.
    pub fn with_parts(http: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!(method = %method, url = %url, "Registry request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON body. An empty success body decodes as default.
    async fn send_json<T>(&self, builder: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.dispatch(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {}", e)))?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Transport(format!("failed to decode response body: {}", e)))
    }

    /// Send and discard the body.
    async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.dispatch(builder).await.map(|_| ())
    }

    async fn dispatch(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &body))
    }

    fn json_body<B: Serialize>(&self, method: Method, path: &str, body: &B) -> RequestBuilder {
        self.request(method, path).json(body)
    }
}

/// Classify a non-success response using its `{code, message}` body.
fn status_error(code: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<StatusPayload>(body)
        .map(|payload| payload.message)
        .unwrap_or_default();
    ApiError::status(code, message)
}

fn wait_path(operation_id: &str, location: &OperationLocation) -> String {
    format!(
        "{}/organizations/{}/projects/{}/operations/{}/wait",
        OPERATION_PREFIX,
        encode(&location.organization_id),
        encode(&location.project_id),
        encode(operation_id)
    )
}

fn complete_path(at: &BoxCoordinates, object: &str) -> String {
    format!("{}/direct/complete/{}", at.architecture_path(), encode(object))
}

#[async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn read_box(&self, at: &BoxCoordinates) -> ApiResult<()> {
        self.send_empty(self.request(Method::GET, &at.box_path())).await
    }

    async fn create_box(
        &self,
        at: &BoxCoordinates,
        data: &BoxRecord,
    ) -> ApiResult<CreateBoxResponse> {
        let path = format!("{}/boxes", at.registry_path());
        self.send_json(self.json_body(Method::POST, &path, data)).await
    }

    async fn wait_operation(
        &self,
        operation_id: &str,
        location: &OperationLocation,
        timeout: Duration,
    ) -> ApiResult<WaitResponse> {
        let timeout = format!("{}s", timeout.as_secs());
        let builder = self
            .request(Method::GET, &wait_path(operation_id, location))
            .query(&[("timeout", timeout.as_str())]);
        self.send_json(builder).await
    }

    async fn read_version(&self, at: &BoxCoordinates) -> ApiResult<VersionResponse> {
        self.send_json(self.request(Method::GET, &at.version_path())).await
    }

    async fn create_version(
        &self,
        at: &BoxCoordinates,
        data: &VersionRecord,
    ) -> ApiResult<VersionResponse> {
        let path = format!("{}/versions", at.box_path());
        self.send_json(self.json_body(Method::POST, &path, data)).await
    }

    async fn read_provider(&self, at: &BoxCoordinates) -> ApiResult<()> {
        self.send_empty(self.request(Method::GET, &at.provider_path())).await
    }

    async fn create_provider(&self, at: &BoxCoordinates, data: &ProviderRecord) -> ApiResult<()> {
        let path = format!("{}/providers", at.version_path());
        self.send_empty(self.json_body(Method::POST, &path, data)).await
    }

    async fn read_architecture(&self, at: &BoxCoordinates) -> ApiResult<()> {
        self.send_empty(self.request(Method::GET, &at.architecture_path())).await
    }

    async fn create_architecture(
        &self,
        at: &BoxCoordinates,
        data: &ArchitectureRecord,
    ) -> ApiResult<()> {
        let path = format!("{}/architectures", at.provider_path());
        self.send_empty(self.json_body(Method::POST, &path, data)).await
    }

    async fn update_architecture(
        &self,
        at: &BoxCoordinates,
        data: &ArchitectureRecord,
    ) -> ApiResult<()> {
        self.send_empty(self.json_body(Method::PUT, &at.architecture_path(), data))
            .await
    }

    async fn upload_ticket(&self, at: &BoxCoordinates) -> ApiResult<UploadTicket> {
        let path = format!("{}/upload", at.architecture_path());
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn direct_upload_ticket(&self, at: &BoxCoordinates) -> ApiResult<DirectUploadTicket> {
        let path = format!("{}/direct/upload", at.architecture_path());
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn complete_direct_upload(&self, at: &BoxCoordinates, object: &str) -> ApiResult<()> {
        self.send_empty(self.request(Method::PUT, &complete_path(at, object)))
            .await
    }

    async fn release_version(&self, at: &BoxCoordinates) -> ApiResult<()> {
        let path = format!("{}/release", at.version_path());
        self.send_empty(self.request(Method::PUT, &path)).await
    }
}
