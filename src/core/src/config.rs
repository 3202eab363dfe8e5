//! Publish configuration.
//!
//! [`PublishSettings`] is what the user writes (file and/or flags).
//! [`PublishSettings::resolve`] validates it, fills environment defaults and
//! produces the immutable [`PublishConfig`] a publish run works from.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PublishError, Result};

/// Registry API address used when nothing else is configured.
pub const DEFAULT_API_ADDRESS: &str = "api.cloud.hashicorp.com:443";

/// OAuth issuer used when nothing else is configured.
pub const DEFAULT_AUTH_URL: &str = "https://auth.idp.hashicorp.com";

/// Environment variable consulted for the API address.
pub const ENV_API_ADDRESS: &str = "HCP_API_ADDRESS";

/// Environment variable consulted for the OAuth client id.
pub const ENV_CLIENT_ID: &str = "HCP_CLIENT_ID";

/// Environment variable consulted for the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "HCP_CLIENT_SECRET";

/// User-supplied publish settings, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// `registry/box` tag
    pub box_tag: Option<String>,
    pub box_description: Option<String>,
    pub box_private: bool,
    pub version: Option<String>,
    pub version_description: Option<String>,
    /// Leave the version unreleased after upload
    pub no_release: bool,
    /// Architecture override (otherwise read from the box metadata)
    pub architecture: Option<String>,
    /// Architecture flagged as default when it is first created
    pub default_architecture: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Externally hosted box; disables the upload steps
    pub box_download_url: Option<String>,
    /// Force proxied upload instead of direct-to-storage
    pub no_direct_upload: bool,
    /// `TYPE:VALUE`, e.g. `sha256:abc...`
    pub box_checksum: Option<String>,
    pub api_address: Option<String>,
    pub auth_url: Option<String>,
    pub insecure_skip_tls_verify: bool,
}

impl PublishSettings {
    /// Load settings from a YAML (`.yaml`/`.yml`) or JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            PublishError::config(format!(
                "failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let settings = if is_yaml {
            serde_yaml::from_str(&data)?
        } else {
            serde_json::from_str(&data)?
        };
        Ok(settings)
    }

    /// Overlay `other` on top of `self`. Set values in `other` win.
    pub fn merge(self, other: PublishSettings) -> Self {
        Self {
            box_tag: other.box_tag.or(self.box_tag),
            box_description: other.box_description.or(self.box_description),
            box_private: other.box_private || self.box_private,
            version: other.version.or(self.version),
            version_description: other.version_description.or(self.version_description),
            no_release: other.no_release || self.no_release,
            architecture: other.architecture.or(self.architecture),
            default_architecture: other.default_architecture.or(self.default_architecture),
            client_id: other.client_id.or(self.client_id),
            client_secret: other.client_secret.or(self.client_secret),
            box_download_url: other.box_download_url.or(self.box_download_url),
            no_direct_upload: other.no_direct_upload || self.no_direct_upload,
            box_checksum: other.box_checksum.or(self.box_checksum),
            api_address: other.api_address.or(self.api_address),
            auth_url: other.auth_url.or(self.auth_url),
            insecure_skip_tls_verify: other.insecure_skip_tls_verify
                || self.insecure_skip_tls_verify,
        }
    }

    /// Validate and resolve against the process environment.
    pub fn resolve(self) -> Result<PublishConfig> {
        self.resolve_with_env(|key| std::env::var(key).ok())
    }

    /// Validate and resolve, reading environment defaults through `env`.
    ///
    /// Every problem is collected; the returned error lists all of them.
    pub fn resolve_with_env<F>(self, env: F) -> Result<PublishConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        let api_address = non_empty(self.api_address)
            .or_else(|| non_empty(env(ENV_API_ADDRESS)))
            .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());
        let is_default_api = api_address == DEFAULT_API_ADDRESS;

        if self.insecure_skip_tls_verify && is_default_api {
            errors.push("insecure_skip_tls_verify cannot be enabled for HCP".to_string());
        }

        let client_id = non_empty(self.client_id).or_else(|| non_empty(env(ENV_CLIENT_ID)));
        let client_secret =
            non_empty(self.client_secret).or_else(|| non_empty(env(ENV_CLIENT_SECRET)));

        let tag = non_empty(self.box_tag);
        let version = non_empty(self.version);
        if tag.is_none() {
            errors.push("box_tag must be set".to_string());
        }
        if version.is_none() {
            errors.push("version must be set".to_string());
        }

        let box_tag = match BoxTag::parse(tag.as_deref().unwrap_or_default()) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.push(message);
                None
            }
        };

        let checksum = match non_empty(self.box_checksum) {
            Some(raw) => match Checksum::parse(&raw) {
                Ok(parsed) => Some(parsed),
                Err(message) => {
                    errors.push(message);
                    None
                }
            },
            None => None,
        };

        if is_default_api {
            if client_id.is_none() {
                errors.push("client_id must be set".to_string());
            }
            if client_secret.is_none() {
                errors.push("client_secret must be set".to_string());
            }
        }

        let (Some(box_tag), Some(version), true) = (box_tag, version, errors.is_empty()) else {
            return Err(PublishError::ConfigError(errors));
        };

        Ok(PublishConfig {
            tag: box_tag,
            version,
            box_description: self.box_description.unwrap_or_default(),
            box_private: self.box_private,
            version_description: self.version_description.unwrap_or_default(),
            no_release: self.no_release,
            architecture: non_empty(self.architecture),
            default_architecture: self.default_architecture.unwrap_or_default(),
            box_download_url: non_empty(self.box_download_url),
            no_direct_upload: self.no_direct_upload,
            checksum,
            api: ApiConfig {
                address: api_address,
                auth_url: non_empty(self.auth_url).unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
                client_id,
                client_secret,
                insecure_skip_tls_verify: self.insecure_skip_tls_verify && !is_default_api,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A `registry/box` tag split into its two halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxTag {
    pub registry: String,
    pub box_name: String,
}

impl BoxTag {
    /// Split a tag on its first `/`. Both halves must be non-empty.
    pub fn parse(tag: &str) -> std::result::Result<Self, String> {
        match tag.split_once('/') {
            Some((registry, box_name)) if !registry.is_empty() && !box_name.is_empty() => {
                Ok(Self {
                    registry: registry.to_string(),
                    box_name: box_name.to_string(),
                })
            }
            _ => Err("box_tag must include registry and box name".to_string()),
        }
    }
}

impl std::fmt::Display for BoxTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.registry, self.box_name)
    }
}

/// Box checksum as `TYPE:VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub kind: String,
    pub value: String,
}

impl Checksum {
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        match raw.split_once(':') {
            Some((kind, value)) if !kind.is_empty() && !value.is_empty() => Ok(Self {
                kind: kind.to_string(),
                value: value.to_string(),
            }),
            _ => Err(
                "box_checksum format invalid (format: CHECKSUM_TYPE:CHECKSUM_VALUE)".to_string(),
            ),
        }
    }
}

/// How to reach and authenticate against the registry API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host (and optional port), or a full `http(s)://` base URL
    pub address: String,
    pub auth_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub insecure_skip_tls_verify: bool,
}

impl ApiConfig {
    /// Base URL for API requests.
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("https://{}", address)
        }
    }

    /// Client credentials, when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

/// Resolved, immutable configuration for one publish run.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub tag: BoxTag,
    pub version: String,
    pub box_description: String,
    pub box_private: bool,
    pub version_description: String,
    pub no_release: bool,
    pub architecture: Option<String>,
    pub default_architecture: String,
    /// Download URL template; placeholders are rendered per run
    pub box_download_url: Option<String>,
    pub no_direct_upload: bool,
    pub checksum: Option<Checksum>,
    pub api: ApiConfig,
}

impl PublishConfig {
    pub fn registry(&self) -> &str {
        &self.tag.registry
    }

    pub fn box_name(&self) -> &str {
        &self.tag.box_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn minimal() -> PublishSettings {
        PublishSettings {
            box_tag: Some("hashicorp/precise64".to_string()),
            version: Some("0.5".to_string()),
            client_id: Some("TEST-CLIENT-ID".to_string()),
            client_secret: Some("TEST-CLIENT-SECRET".to_string()),
            ..Default::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn resolve_err(settings: PublishSettings) -> String {
        settings.resolve_with_env(no_env).unwrap_err().to_string()
    }

    #[test]
    fn test_minimal_settings_resolve() {
        let config = minimal().resolve_with_env(no_env).unwrap();
        assert_eq!(config.registry(), "hashicorp");
        assert_eq!(config.box_name(), "precise64");
        assert_eq!(config.tag.to_string(), "hashicorp/precise64");
        assert_eq!(config.version, "0.5");
        assert_eq!(config.api.address, DEFAULT_API_ADDRESS);
        assert_eq!(config.api.auth_url, DEFAULT_AUTH_URL);
        assert!(config.checksum.is_none());
        assert!(config.box_download_url.is_none());
    }

    #[test]
    fn test_tag_split_on_first_separator() {
        let tag = BoxTag::parse("a/b").unwrap();
        assert_eq!(tag.registry, "a");
        assert_eq!(tag.box_name, "b");

        let tag = BoxTag::parse("org/box/extra").unwrap();
        assert_eq!(tag.registry, "org");
        assert_eq!(tag.box_name, "box/extra");
    }

    #[test]
    fn test_tag_without_separator_rejected() {
        let mut settings = minimal();
        settings.box_tag = Some("box-name".to_string());
        assert!(resolve_err(settings).contains("box_tag must include registry and box name"));
    }

    #[test]
    fn test_tag_with_empty_half_rejected() {
        assert!(BoxTag::parse("registry/").is_err());
        assert!(BoxTag::parse("/box").is_err());
    }

    #[test]
    fn test_missing_tag_and_version() {
        let mut settings = minimal();
        settings.box_tag = None;
        settings.version = None;
        let err = resolve_err(settings);
        assert!(err.contains("box_tag must be set"));
        assert!(err.contains("version must be set"));
    }

    #[test]
    fn test_checksum_with_type() {
        let mut settings = minimal();
        settings.box_checksum = Some("sha256:testchecksumvalue".to_string());
        let config = settings.resolve_with_env(no_env).unwrap();
        let checksum = config.checksum.unwrap();
        assert_eq!(checksum.kind, "sha256");
        assert_eq!(checksum.value, "testchecksumvalue");
    }

    #[test]
    fn test_checksum_without_colon_rejected() {
        let mut settings = minimal();
        settings.box_checksum = Some("testchecksumvalue".to_string());
        assert!(resolve_err(settings).contains("box_checksum format invalid"));
    }

    #[test]
    fn test_missing_credentials_for_default_api() {
        let mut settings = minimal();
        settings.client_id = None;
        assert!(resolve_err(settings).contains("client_id must be set"));

        let mut settings = minimal();
        settings.client_secret = None;
        assert!(resolve_err(settings).contains("client_secret must be set"));
    }

    #[test]
    fn test_custom_address_without_credentials() {
        let mut settings = minimal();
        settings.client_id = None;
        settings.client_secret = None;
        settings.api_address = Some("localhost".to_string());
        let config = settings.resolve_with_env(no_env).unwrap();
        assert!(config.api.credentials().is_none());
        assert_eq!(config.api.base_url(), "https://localhost");
    }

    #[test]
    fn test_skip_tls_verify_only_for_custom_address() {
        let mut settings = minimal();
        settings.insecure_skip_tls_verify = true;
        assert!(resolve_err(settings).contains("insecure_skip_tls_verify cannot be enabled for HCP"));

        let mut settings = minimal();
        settings.insecure_skip_tls_verify = true;
        settings.api_address = Some("localhost".to_string());
        let config = settings.resolve_with_env(no_env).unwrap();
        assert!(config.api.insecure_skip_tls_verify);
    }

    #[test]
    fn test_environment_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_ADDRESS, "registry.internal:8443"),
            (ENV_CLIENT_ID, "env-id"),
            (ENV_CLIENT_SECRET, "env-secret"),
        ]);
        let mut settings = minimal();
        settings.client_id = None;
        settings.client_secret = None;

        let config = settings
            .resolve_with_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api.address, "registry.internal:8443");
        assert_eq!(config.api.credentials(), Some(("env-id", "env-secret")));
    }

    #[test]
    fn test_explicit_values_beat_environment() {
        let mut settings = minimal();
        settings.api_address = Some("explicit:443".to_string());
        let config = settings
            .resolve_with_env(|key| match key {
                ENV_API_ADDRESS => Some("from-env:443".to_string()),
                ENV_CLIENT_ID => Some("env-id".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api.address, "explicit:443");
        assert_eq!(config.api.client_id.as_deref(), Some("TEST-CLIENT-ID"));
    }

    #[test]
    fn test_base_url_keeps_scheme() {
        let mut settings = minimal();
        settings.api_address = Some("http://127.0.0.1:8080/".to_string());
        let config = settings.resolve_with_env(no_env).unwrap();
        assert_eq!(config.api.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = PublishSettings {
            box_tag: Some("file/box".to_string()),
            version: Some("1.0".to_string()),
            no_release: true,
            ..Default::default()
        };
        let overrides = PublishSettings {
            version: Some("2.0".to_string()),
            ..Default::default()
        };
        let merged = base.merge(overrides);
        assert_eq!(merged.box_tag.as_deref(), Some("file/box"));
        assert_eq!(merged.version.as_deref(), Some("2.0"));
        assert!(merged.no_release);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("publish.yaml");
        std::fs::write(
            &path,
            "box_tag: hashicorp/precise64\nversion: \"0.5\"\nno_direct_upload: true\n",
        )
        .unwrap();

        let settings = PublishSettings::from_file(&path).unwrap();
        assert_eq!(settings.box_tag.as_deref(), Some("hashicorp/precise64"));
        assert_eq!(settings.version.as_deref(), Some("0.5"));
        assert!(settings.no_direct_upload);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("publish.json");
        std::fs::write(&path, r#"{"box_tag": "a/b", "architecture": "arm64"}"#).unwrap();

        let settings = PublishSettings::from_file(&path).unwrap();
        assert_eq!(settings.box_tag.as_deref(), Some("a/b"));
        assert_eq!(settings.architecture.as_deref(), Some("arm64"));
    }

    #[test]
    fn test_from_missing_file() {
        let err = PublishSettings::from_file(Path::new("/nonexistent/publish.yaml")).unwrap_err();
        assert!(matches!(err, PublishError::ConfigError(_)));
    }
}
