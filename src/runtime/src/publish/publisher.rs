//! Publish orchestration: validate the artifact, resolve what is being
//! published, then run the step sequence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use boxpub_core::artifact::{
    provider_from_builder_name, render_template, BuilderKind, InputArtifact, PublishedArtifact,
};
use boxpub_core::config::PublishConfig;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::{events, EventEmitter};
use tokio_util::sync::CancellationToken;

use super::context::PublishContext;
use super::retry::RetryPolicy;
use super::step::run_steps;
use super::steps::{workflow, BOX_CREATE_TIMEOUT};
use super::transfer::BoxTransfer;
use crate::archive::{read_box_metadata, BoxMetadata};
use crate::registry::{BoxCoordinates, RegistryApi};

/// Publishes box artifacts to one registry location.
pub struct Publisher {
    config: PublishConfig,
    api: Arc<dyn RegistryApi>,
    transfer: Arc<dyn BoxTransfer>,
    emitter: EventEmitter,
    retry: RetryPolicy,
    box_create_timeout: Duration,
}

impl Publisher {
    pub fn new(
        config: PublishConfig,
        api: Arc<dyn RegistryApi>,
        transfer: Arc<dyn BoxTransfer>,
    ) -> Self {
        Self {
            config,
            api,
            transfer,
            emitter: EventEmitter::default(),
            retry: RetryPolicy::upload(),
            box_create_timeout: BOX_CREATE_TIMEOUT,
        }
    }

    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_box_create_timeout(mut self, timeout: Duration) -> Self {
        self.box_create_timeout = timeout;
        self
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Publish `artifact`, reconciling registry state and uploading the box.
    ///
    /// Artifact checks run before any registry call. The run stops at the
    /// first failing step; nothing already created is rolled back.
    pub async fn publish(
        &self,
        artifact: &InputArtifact,
        cancel: CancellationToken,
    ) -> Result<PublishedArtifact> {
        let kind = artifact.builder_kind()?;
        let box_path = artifact.box_file()?.to_path_buf();

        // Metadata is read at most once, and only when something needs it
        let (architecture, provider) = {
            let mut metadata = MetadataCache::new(&box_path, &self.emitter);

            let architecture = match &self.config.architecture {
                Some(architecture) => architecture.clone(),
                None => metadata
                    .get()
                    .await?
                    .architecture()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        PublishError::MetadataError(
                            "Could not determine architecture from box metadata.json file"
                                .to_string(),
                        )
                    })?,
            };

            let provider = match kind {
                BuilderKind::Artifice => {
                    let box_metadata = metadata.get().await.map_err(|e| {
                        PublishError::MetadataError(format!("error getting provider name: {}", e))
                    })?;
                    box_metadata.provider().map(str::to_string).ok_or_else(|| {
                        PublishError::MetadataError(
                            "error getting provider name: Error reading provider from box \
                             metadata.json file"
                                .to_string(),
                        )
                    })?
                }
                BuilderKind::Vagrant => provider_from_builder_name(&artifact.id),
            };

            (architecture, provider)
        };

        let download_url = match &self.config.box_download_url {
            Some(template) => Some(render_download_url(
                template,
                artifact,
                &provider,
                &architecture,
            )?),
            None => None,
        };

        let coordinates = BoxCoordinates {
            registry: self.config.registry().to_string(),
            box_name: self.config.box_name().to_string(),
            version: self.config.version.clone(),
            provider: provider.clone(),
            architecture,
        };

        tracing::info!(
            registry = %coordinates.registry,
            box_name = %coordinates.box_name,
            version = %coordinates.version,
            provider = %coordinates.provider,
            architecture = %coordinates.architecture,
            "Publishing box"
        );

        let steps = workflow(download_url.is_none());
        let mut ctx = PublishContext {
            config: &self.config,
            api: self.api.as_ref(),
            transfer: self.transfer.as_ref(),
            emitter: &self.emitter,
            cancel,
            retry: &self.retry,
            box_create_timeout: self.box_create_timeout,
            artifact,
            box_path,
            coordinates,
            download_url,
            direct_upload: !self.config.no_direct_upload,
            upload: None,
            version: None,
        };

        run_steps(&steps, &mut ctx).await?;

        Ok(PublishedArtifact::new(provider, self.config.tag.to_string()))
    }
}

/// Reads box metadata on first use and keeps it for the rest of the run.
struct MetadataCache<'a> {
    path: &'a Path,
    emitter: &'a EventEmitter,
    metadata: Option<BoxMetadata>,
}

impl<'a> MetadataCache<'a> {
    fn new(path: &'a Path, emitter: &'a EventEmitter) -> Self {
        Self {
            path,
            emitter,
            metadata: None,
        }
    }

    async fn get(&mut self) -> Result<&BoxMetadata> {
        if self.metadata.is_none() {
            self.emitter.message(
                events::METADATA_READING,
                "Attempting to extract metadata in box file. This may take some time...",
            );
            let path: PathBuf = self.path.to_path_buf();
            let metadata = tokio::task::spawn_blocking(move || read_box_metadata(&path))
                .await
                .map_err(|e| PublishError::Other(format!("metadata reader panicked: {}", e)))??;
            self.metadata = Some(metadata);
        }

        self.metadata
            .as_ref()
            .ok_or_else(|| PublishError::MetadataError("box metadata unavailable".to_string()))
    }
}

/// Render the configured download URL template for this artifact.
///
/// Exposes `Provider`, `Architecture` and `ArtifactId`, plus every
/// string-valued entry of the artifact's generated data.
pub fn render_download_url(
    template: &str,
    artifact: &InputArtifact,
    provider: &str,
    architecture: &str,
) -> Result<String> {
    let mut data: HashMap<String, String> = artifact
        .generated_data
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
        .collect();
    data.insert("Provider".to_string(), provider.to_string());
    data.insert("Architecture".to_string(), architecture.to_string());
    data.insert("ArtifactId".to_string(), artifact.id.clone());

    render_template(template, &data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_download_url() {
        let mut artifact = InputArtifact::new("vagrant", "virtualbox", vec!["a.box".to_string()]);
        artifact
            .generated_data
            .insert("BuildName".to_string(), serde_json::json!("nightly"));
        artifact
            .generated_data
            .insert("Count".to_string(), serde_json::json!(3));

        let url = render_download_url(
            "https://example.com/{{ .BuildName }}/{{ .Provider }}-{{ .Architecture }}-{{ .ArtifactId }}.box",
            &artifact,
            "virtualbox",
            "amd64",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://example.com/nightly/virtualbox-amd64-virtualbox.box"
        );

        let err = render_download_url("{{ .Count }}", &artifact, "virtualbox", "amd64").unwrap_err();
        assert!(err.to_string().contains("Failed processing box_download_url"));
    }

    #[test]
    fn test_builtin_keys_win_over_generated_data() {
        let mut artifact = InputArtifact::new("vagrant", "vmware", vec!["a.box".to_string()]);
        artifact
            .generated_data
            .insert("Provider".to_string(), serde_json::json!("spoofed"));

        let url = render_download_url("{{ .Provider }}", &artifact, "vmware_desktop", "amd64").unwrap();
        assert_eq!(url, "vmware_desktop");
    }
}
