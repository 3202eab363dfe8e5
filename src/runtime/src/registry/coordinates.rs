//! Composite keys addressing registry resources.

use urlencoding::encode;

/// Registry API path prefix.
pub const API_PREFIX: &str = "/vagrant/2022-09-30";

/// Operation service path prefix.
pub const OPERATION_PREFIX: &str = "/operation/2020-05-05";

/// Full address of an architecture; shorter prefixes address its parents.
/// Each component is percent-encoded as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxCoordinates {
    pub registry: String,
    pub box_name: String,
    pub version: String,
    pub provider: String,
    pub architecture: String,
}

impl BoxCoordinates {
    /// `/registry/{r}`
    pub fn registry_path(&self) -> String {
        format!("{}/registry/{}", API_PREFIX, encode(&self.registry))
    }

    /// `/registry/{r}/box/{b}`
    pub fn box_path(&self) -> String {
        format!("{}/box/{}", self.registry_path(), encode(&self.box_name))
    }

    /// `/registry/{r}/box/{b}/version/{v}`
    pub fn version_path(&self) -> String {
        format!("{}/version/{}", self.box_path(), encode(&self.version))
    }

    /// `/registry/{r}/box/{b}/version/{v}/provider/{p}`
    pub fn provider_path(&self) -> String {
        format!("{}/provider/{}", self.version_path(), encode(&self.provider))
    }

    /// `/registry/{r}/box/{b}/version/{v}/provider/{p}/architecture/{a}`
    pub fn architecture_path(&self) -> String {
        format!(
            "{}/architecture/{}",
            self.provider_path(),
            encode(&self.architecture)
        )
    }
}

impl std::fmt::Display for BoxCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} v{} ({}, {})",
            self.registry, self.box_name, self.version, self.provider, self.architecture
        )
    }
}
