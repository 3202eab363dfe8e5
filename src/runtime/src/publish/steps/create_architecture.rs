use async_trait::async_trait;
use boxpub_core::config::PublishConfig;
use boxpub_core::error::Result;
use boxpub_core::event::events;

use crate::publish::context::PublishContext;
use crate::publish::step::{Step, StepAction};
use crate::registry::{ArchitectureRecord, BoxData};

/// Checksum type sent when no checksum is configured.
pub const CHECKSUM_NONE: &str = "NONE";

/// Ensure the architecture exists and carries current transfer metadata.
///
/// Unlike the parent resources, an existing architecture is updated in place.
pub struct CreateArchitecture;

#[async_trait]
impl Step for CreateArchitecture {
    fn name(&self) -> &'static str {
        "create-architecture"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        ensure_architecture(ctx).await.into()
    }
}

async fn ensure_architecture(ctx: &mut PublishContext<'_>) -> Result<()> {
    let download_url = ctx.download_url.as_deref();

    match ctx.guard(ctx.api.read_architecture(&ctx.coordinates)).await? {
        Ok(()) => {
            let update = architecture_update(ctx.config, download_url);
            ctx.guard(ctx.api.update_architecture(&ctx.coordinates, &update))
                .await?
                .map_err(|e| e.into_publish_error("Failure updating existing architecture"))?;
            ctx.message(
                events::ARCHITECTURE_UPDATED,
                format!("Updated architecture: {}", ctx.coordinates.architecture),
            );
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            let record =
                architecture_record(ctx.config, &ctx.coordinates.architecture, download_url);
            ctx.guard(ctx.api.create_architecture(&ctx.coordinates, &record))
                .await?
                .map_err(|e| e.into_publish_error("Failure creating new architecture"))?;
            tracing::info!(
                architecture = %ctx.coordinates.architecture,
                default = ?record.default,
                "Created architecture"
            );
            ctx.message(
                events::ARCHITECTURE_CREATED,
                format!("Created new architecture: {}", ctx.coordinates.architecture),
            );
            Ok(())
        }
        Err(err) => Err(err.into_publish_error("Failure retrieving architecture")),
    }
}

/// Describe a new architecture as the registry should store it.
pub fn architecture_record(
    config: &PublishConfig,
    architecture: &str,
    download_url: Option<&str>,
) -> ArchitectureRecord {
    ArchitectureRecord {
        architecture_type: architecture.to_string(),
        default: Some(architecture == config.default_architecture),
        box_data: Some(box_data(config, download_url)),
    }
}

/// Payload for an in-place update: transfer metadata only.
pub fn architecture_update(
    config: &PublishConfig,
    download_url: Option<&str>,
) -> ArchitectureRecord {
    ArchitectureRecord {
        box_data: Some(box_data(config, download_url)),
        ..Default::default()
    }
}

fn box_data(config: &PublishConfig, download_url: Option<&str>) -> BoxData {
    let mut data = BoxData {
        download_url: download_url
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        checksum: None,
        checksum_type: CHECKSUM_NONE.to_string(),
    };

    if let Some(checksum) = &config.checksum {
        data.checksum = Some(checksum.value.clone());
        data.checksum_type = checksum.kind.to_uppercase();
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxpub_core::config::PublishSettings;

    fn config(checksum: Option<&str>, default_architecture: &str) -> PublishConfig {
        PublishSettings {
            box_tag: Some("hashicorp/precise64".to_string()),
            version: Some("0.5".to_string()),
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            box_checksum: checksum.map(str::to_string),
            default_architecture: Some(default_architecture.to_string()),
            ..Default::default()
        }
        .resolve_with_env(|_| None)
        .unwrap()
    }

    #[test]
    fn test_default_flag_follows_default_architecture() {
        let config = config(None, "amd64");
        assert_eq!(architecture_record(&config, "amd64", None).default, Some(true));
        assert_eq!(architecture_record(&config, "arm64", None).default, Some(false));
    }

    #[test]
    fn test_update_leaves_type_and_default_alone() {
        let config = config(Some("sha256:abc123"), "amd64");
        let update = architecture_update(&config, Some("https://example.com/a.box"));
        assert!(update.architecture_type.is_empty());
        assert!(update.default.is_none());

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"box_data": {
                "download_url": "https://example.com/a.box",
                "checksum": "abc123",
                "checksum_type": "SHA256",
            }})
        );
    }

    #[test]
    fn test_no_checksum_sends_none_type() {
        let record = architecture_record(&config(None, "amd64"), "amd64", None);
        let data = record.box_data.unwrap();
        assert_eq!(data.checksum_type, "NONE");
        assert!(data.checksum.is_none());
        assert!(data.download_url.is_none());
    }

    #[test]
    fn test_checksum_type_uppercased() {
        let record = architecture_record(&config(Some("sha256:abc123"), "amd64"), "amd64", None);
        let data = record.box_data.unwrap();
        assert_eq!(data.checksum_type, "SHA256");
        assert_eq!(data.checksum.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_download_url_only_when_non_empty() {
        let config = config(None, "amd64");
        let record = architecture_record(&config, "amd64", Some(""));
        assert!(record.box_data.unwrap().download_url.is_none());

        let record = architecture_record(&config, "amd64", Some("https://example.com/a.box"));
        assert_eq!(
            record.box_data.unwrap().download_url.as_deref(),
            Some("https://example.com/a.box")
        );
    }
}
