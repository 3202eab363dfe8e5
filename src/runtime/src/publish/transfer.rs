//! Byte transfer of box files to upload targets.

use std::path::Path;

use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};
use reqwest::header::CONTENT_LENGTH;
use reqwest::StatusCode;

/// Moves a local file to an upload URL in a single attempt.
#[async_trait]
pub trait BoxTransfer: Send + Sync {
    /// PUT the file at `path` to `url`. Only an HTTP 200 response counts
    /// as success.
    async fn put_file(&self, url: &str, path: &Path) -> Result<()>;
}

/// Streams files over HTTP.
pub struct HttpTransfer {
    http: reqwest::Client,
}

impl HttpTransfer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for HttpTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoxTransfer for HttpTransfer {
    async fn put_file(&self, url: &str, path: &Path) -> Result<()> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        tracing::debug!(path = %path.display(), size, "Streaming box file");

        let response = self
            .http
            .put(url)
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::from(file))
            .send()
            .await
            .map_err(|e| PublishError::Other(e.to_string()))?;

        check_status(response.status())
    }
}

fn check_status(status: StatusCode) -> Result<()> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(PublishError::Other(format!(
            "bad HTTP status: {}",
            status.as_u16()
        )))
    }
}
