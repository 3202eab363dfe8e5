//! Input and output artifacts of a publish run.

use std::collections::HashMap;
use std::path::Path;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use crate::error::{PublishError, Result};

/// Builder id carried by artifacts this tool produces.
pub const BUILDER_ID: &str = "hashicorp.post-processor.vagrant-registry";

/// File suffix the first artifact file must carry.
pub const BOX_SUFFIX: &str = ".box";

/// How an upstream producer packaged the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    /// Box built by the vagrant builder or post-processor; the artifact id
    /// names the provider.
    Vagrant,
    /// Box handed over as an opaque file; the provider must be read from
    /// the box metadata.
    Artifice,
}

impl BuilderKind {
    /// Look up a builder id in the allow-list of recognized producers.
    pub fn from_builder_id(builder_id: &str) -> Option<Self> {
        match builder_id {
            "mitchellh.post-processor.vagrant" | "vagrant" => Some(Self::Vagrant),
            "packer.post-processor.artifice" => Some(Self::Artifice),
            _ => None,
        }
    }
}

/// Artifact handed to the publisher by an earlier stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputArtifact {
    pub builder_id: String,
    /// Upstream builder name, e.g. `virtualbox`
    pub id: String,
    pub files: Vec<String>,
    /// Values generated by earlier stages, usable in download URL templates
    #[serde(default)]
    pub generated_data: HashMap<String, serde_json::Value>,
}

impl InputArtifact {
    pub fn new(builder_id: impl Into<String>, id: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            builder_id: builder_id.into(),
            id: id.into(),
            files,
            generated_data: HashMap::new(),
        }
    }

    /// Check the builder id against the allow-list.
    pub fn builder_kind(&self) -> Result<BuilderKind> {
        BuilderKind::from_builder_id(&self.builder_id).ok_or_else(|| {
            PublishError::ArtifactError(format!(
                "Unknown artifact type: this post-processor requires an input artifact from the \
                 artifice post-processor, vagrant post-processor, or vagrant builder: {}",
                self.builder_id
            ))
        })
    }

    /// The box archive to publish: the first file, which must end in `.box`.
    pub fn box_file(&self) -> Result<&Path> {
        let first = self.files.first().ok_or_else(|| {
            PublishError::ArtifactError("No files provided in artifact for upload".to_string())
        })?;

        if !first.ends_with(BOX_SUFFIX) {
            return Err(PublishError::ArtifactError(format!(
                "Unknown file in artifact, Vagrant box with .box suffix is required as first \
                 artifact file: {:?}",
                self.files
            )));
        }

        Ok(Path::new(first))
    }
}

/// Map an upstream builder name to the provider name the registry expects.
pub fn provider_from_builder_name(name: &str) -> String {
    match name {
        "vmware" => "vmware_desktop".to_string(),
        other => other.to_string(),
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedArtifact {
    pub provider: String,
    pub tag: String,
}

impl PublishedArtifact {
    pub fn new(provider: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tag: tag.into(),
        }
    }

    pub fn builder_id(&self) -> &'static str {
        BUILDER_ID
    }
}

impl std::fmt::Display for PublishedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.provider, self.tag)
    }
}

/// Render `{{ .Name }}` placeholders in a download URL template.
///
/// Unknown placeholders and malformed templates are errors. Values are
/// inserted verbatim.
pub fn render_template(template: &str, data: &HashMap<String, String>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .render_template(&to_handlebars(template), data)
        .map_err(|e| PublishError::config(format!("Failed processing box_download_url: {}", e)))
}

/// `{{ .Name }}` field references become handlebars paths `{{ Name }}`.
fn to_handlebars(template: &str) -> String {
    template.replace("{{ .", "{{ ").replace("{{.", "{{")
}
