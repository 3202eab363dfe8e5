//! Box registry access.
//!
//! [`RegistryApi`] is the seam the publish steps talk to. The production
//! implementation is [`HttpRegistryClient`]; tests substitute in-memory fakes.
//!
//! Resources form a strict hierarchy, each addressed by [`BoxCoordinates`]:
//!
//! ```text
//! registry/{r}
//! └── box/{b}
//!     └── version/{v}          (release state)
//!         └── provider/{p}
//!             └── architecture/{a}   (download url, checksum)
//! ```

pub mod auth;
pub mod client;
pub mod coordinates;
pub mod models;

use std::time::Duration;

use async_trait::async_trait;
use boxpub_core::error::PublishError;

pub use client::HttpRegistryClient;
pub use coordinates::BoxCoordinates;
pub use models::{
    ArchitectureRecord, BoxData, BoxRecord, CreateBoxResponse, DirectUploadTicket, Operation,
    OperationLocation, OperationState, ProviderRecord, StatusPayload, UploadTicket,
    VersionRecord, VersionResponse, VersionState, WaitResponse,
};

/// Message used when the registry rejects a call without saying why.
pub const GENERIC_ERROR_MESSAGE: &str = "Unexpected error encountered";

/// Failure of a single registry call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The registry answered with a non-success status
    #[error("[{code}] {message}")]
    Status { code: u16, message: String },

    /// No structured response could be obtained
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    /// Build a status error, substituting the generic message when empty.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        ApiError::Status { code, message }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Status { message, .. } => message,
            ApiError::Transport(message) => message,
        }
    }

    /// Not-found is recognized by status code alone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { code: 404, .. })
    }

    /// Convert into a halting workflow error. `context` prefixes classified
    /// registry failures, e.g. "Failure retrieving box".
    pub fn into_publish_error(self, context: &str) -> PublishError {
        match self {
            ApiError::Status { message, .. } => PublishError::registry(context, message),
            ApiError::Transport(message) => PublishError::UnexpectedClientError(message),
        }
    }
}

/// Result of a registry call.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Operations the publisher needs from the box registry.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn read_box(&self, at: &BoxCoordinates) -> ApiResult<()>;

    async fn create_box(&self, at: &BoxCoordinates, data: &BoxRecord)
        -> ApiResult<CreateBoxResponse>;

    /// Block until the operation settles or `timeout` passes server-side.
    async fn wait_operation(
        &self,
        operation_id: &str,
        location: &OperationLocation,
        timeout: Duration,
    ) -> ApiResult<WaitResponse>;

    async fn read_version(&self, at: &BoxCoordinates) -> ApiResult<VersionResponse>;

    async fn create_version(
        &self,
        at: &BoxCoordinates,
        data: &VersionRecord,
    ) -> ApiResult<VersionResponse>;

    async fn read_provider(&self, at: &BoxCoordinates) -> ApiResult<()>;

    async fn create_provider(&self, at: &BoxCoordinates, data: &ProviderRecord) -> ApiResult<()>;

    async fn read_architecture(&self, at: &BoxCoordinates) -> ApiResult<()>;

    async fn create_architecture(
        &self,
        at: &BoxCoordinates,
        data: &ArchitectureRecord,
    ) -> ApiResult<()>;

    /// Fields left unset in `data` keep their stored values.
    async fn update_architecture(
        &self,
        at: &BoxCoordinates,
        data: &ArchitectureRecord,
    ) -> ApiResult<()>;

    /// Request a single-use proxied upload URL.
    async fn upload_ticket(&self, at: &BoxCoordinates) -> ApiResult<UploadTicket>;

    /// Request a one-time direct-to-storage upload ticket.
    async fn direct_upload_ticket(&self, at: &BoxCoordinates) -> ApiResult<DirectUploadTicket>;

    /// Associate directly uploaded bytes with the architecture.
    async fn complete_direct_upload(&self, at: &BoxCoordinates, object: &str) -> ApiResult<()>;

    async fn release_version(&self, at: &BoxCoordinates) -> ApiResult<()>;
}
