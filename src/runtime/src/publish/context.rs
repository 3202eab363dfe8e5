//! Execution context shared by the publish steps.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use boxpub_core::artifact::InputArtifact;
use boxpub_core::config::PublishConfig;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::EventEmitter;
use tokio_util::sync::CancellationToken;

use super::retry::RetryPolicy;
use super::transfer::BoxTransfer;
use crate::registry::{BoxCoordinates, RegistryApi, VersionRecord};

/// Where the box bytes go, as handed out by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub url: String,
    /// Object token to confirm a direct upload with
    pub object: Option<String>,
}

/// State of one publish run.
///
/// Created by the publisher, mutated by steps in order, dropped when the
/// run ends.
pub struct PublishContext<'a> {
    pub config: &'a PublishConfig,
    pub api: &'a dyn RegistryApi,
    pub transfer: &'a dyn BoxTransfer,
    pub emitter: &'a EventEmitter,
    pub cancel: CancellationToken,
    pub retry: &'a RetryPolicy,
    /// Server-side wait for box provisioning
    pub box_create_timeout: Duration,

    pub artifact: &'a InputArtifact,
    pub box_path: PathBuf,
    pub coordinates: BoxCoordinates,
    /// Rendered download URL; when set the box is not uploaded
    pub download_url: Option<String>,
    /// Effective strategy, possibly downgraded by the size check
    pub direct_upload: bool,

    pub upload: Option<UploadTarget>,
    /// Version as last returned by the registry
    pub version: Option<VersionRecord>,
}

impl PublishContext<'_> {
    /// Drive `fut` unless the run is cancelled first.
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PublishError::Cancelled("publish run cancelled".to_string())),
            output = fut => Ok(output),
        }
    }

    pub fn say(&self, key: &str, message: impl Into<String>) {
        self.emitter.say(key, message);
    }

    pub fn message(&self, key: &str, message: impl Into<String>) {
        self.emitter.message(key, message);
    }

    pub fn error(&self, key: &str, message: impl Into<String>) {
        self.emitter.error(key, message);
    }
}
