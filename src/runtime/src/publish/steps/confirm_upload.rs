use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::events;

use crate::publish::context::{PublishContext, UploadTarget};
use crate::publish::step::{Step, StepAction};

/// Tell the registry a direct upload finished. No-op for proxied uploads.
pub struct ConfirmUpload;

#[async_trait]
impl Step for ConfirmUpload {
    fn name(&self) -> &'static str {
        "confirm-upload"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        confirm(ctx).await.into()
    }
}

async fn confirm(ctx: &mut PublishContext<'_>) -> Result<()> {
    let Some(object) = object_to_confirm(ctx.direct_upload, ctx.upload.as_ref())? else {
        return Ok(());
    };

    ctx.guard(ctx.api.complete_direct_upload(&ctx.coordinates, object))
        .await?
        .map_err(|e| e.into_publish_error("Failure confirming upload"))?;

    tracing::debug!(object, "Direct upload confirmed");
    ctx.message(events::UPLOAD_CONFIRMED, "Upload confirmed");
    Ok(())
}

/// The object token to confirm a direct upload with; a direct upload
/// without one is an error.
fn object_to_confirm(direct_upload: bool, upload: Option<&UploadTarget>) -> Result<Option<&str>> {
    if !direct_upload {
        return Ok(None);
    }

    upload
        .and_then(|target| target.object.as_deref())
        .map(Some)
        .ok_or_else(|| PublishError::UploadError("no direct upload object to confirm".to_string()))
}
