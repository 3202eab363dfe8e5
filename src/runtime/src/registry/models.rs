//! Wire models for the box registry API.

use serde::{Deserialize, Serialize};

/// Release state of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionState {
    Unreleased,
    Released,
    Revoked,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub is_private: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<VersionState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderRecord {
    pub name: String,
}

/// Transfer metadata attached to an architecture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// `NONE`, `MD5`, `SHA1`, `SHA256`, `SHA384` or `SHA512`
    pub checksum_type: String,
}

/// Architecture as created or updated. An update carries only `box_data`,
/// so the type and default flag stay as the registry has them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub architecture_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_data: Option<BoxData>,
}

/// Where a long-running operation lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationLocation {
    pub organization_id: String,
    pub project_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    Pending,
    Running,
    Done,
    #[serde(other)]
    Unknown,
}

/// Error status reported inside an operation or an error response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operation {
    pub id: String,
    pub state: Option<OperationState>,
    pub error: Option<StatusPayload>,
    pub location: Option<OperationLocation>,
}

/// Response to a box create: the provisioning operation, when returned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateBoxResponse {
    pub operation: Option<Operation>,
}

/// Response to an operation wait.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WaitResponse {
    pub operation: Option<Operation>,
}

/// Response to a version read or create.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionResponse {
    pub version: Option<VersionRecord>,
}

/// Single-use proxied upload target.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadTicket {
    pub url: String,
}

/// One-time direct-to-storage upload target.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectUploadTicket {
    pub url: String,
    /// Opaque object token presented when confirming the upload
    pub object: String,
    pub callback: String,
}
