use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::events;

use crate::publish::context::{PublishContext, UploadTarget};
use crate::publish::step::{Step, StepAction};

/// Largest file, in bytes, accepted for direct-to-storage upload (5 GiB).
pub const DIRECT_UPLOAD_LIMIT: u64 = 5_368_709_120;

/// Pick the upload strategy and obtain an upload target.
pub struct PrepareUpload;

#[async_trait]
impl Step for PrepareUpload {
    fn name(&self) -> &'static str {
        "prepare-upload"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        prepare(ctx).await.into()
    }
}

async fn prepare(ctx: &mut PublishContext<'_>) -> Result<()> {
    if ctx.direct_upload {
        check_size_limit(ctx).await;
    }

    ctx.say(
        events::UPLOAD_PREPARING,
        format!("Preparing upload of box: {}", ctx.box_path.display()),
    );

    let target = if ctx.direct_upload {
        let ticket = ctx
            .guard(ctx.api.direct_upload_ticket(&ctx.coordinates))
            .await?
            .map_err(|e| e.into_publish_error("Failure preparing upload"))?;
        tracing::debug!(url = %ticket.url, callback = %ticket.callback, "Direct upload ticket issued");
        upload_target(ticket.url, Some(ticket.object))?
    } else {
        let ticket = ctx
            .guard(ctx.api.upload_ticket(&ctx.coordinates))
            .await?
            .map_err(|e| e.into_publish_error("Failure preparing upload"))?;
        tracing::debug!(url = %ticket.url, "Upload ticket issued");
        upload_target(ticket.url, None)?
    };

    ctx.upload = Some(target);
    Ok(())
}

/// Accept a ticket only if it names somewhere to upload to and, for direct
/// uploads, an object to confirm.
fn upload_target(url: String, object: Option<String>) -> Result<UploadTarget> {
    let what = if object.is_some() {
        "direct upload ticket"
    } else {
        "upload ticket"
    };

    if url.is_empty() || object.as_deref() == Some("") {
        return Err(PublishError::InvalidResponse(what.to_string()));
    }

    Ok(UploadTarget { url, object })
}

/// Downgrade to a proxied upload when the box is too large to go direct.
/// A file that cannot be inspected keeps the requested strategy.
async fn check_size_limit(ctx: &mut PublishContext<'_>) {
    match tokio::fs::metadata(&ctx.box_path).await {
        Ok(metadata) if metadata.len() > DIRECT_UPLOAD_LIMIT => {
            ctx.message(
                events::UPLOAD_SIZE_LIMIT,
                format!(
                    "Asset {} is larger than the direct upload limit. Using proxied upload.",
                    ctx.box_path.display()
                ),
            );
            tracing::info!(size = metadata.len(), limit = DIRECT_UPLOAD_LIMIT, "Direct upload disabled");
            ctx.direct_upload = false;
        }
        Ok(_) => {}
        Err(e) => {
            ctx.error(
                events::UPLOAD_STAT_FAILED,
                format!("Failed to inspect box file {}: {}", ctx.box_path.display(), e),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_target() {
        let target = upload_target("https://up/a".to_string(), Some("OBJ".to_string())).unwrap();
        assert_eq!(target.object.as_deref(), Some("OBJ"));

        let target = upload_target("https://up/a".to_string(), None).unwrap();
        assert!(target.object.is_none());
    }

    #[test]
    fn test_empty_ticket_rejected() {
        let err = upload_target(String::new(), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid response body for upload ticket");

        let err = upload_target(String::new(), Some("OBJ".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid response body for direct upload ticket");

        let err = upload_target("https://up/a".to_string(), Some(String::new())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid response body for direct upload ticket");
    }
}
