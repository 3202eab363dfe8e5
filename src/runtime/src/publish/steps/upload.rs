use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::events;

use crate::publish::context::PublishContext;
use crate::publish::step::{Step, StepAction};

/// Transfer the box to the prepared target, retrying failed attempts.
pub struct Upload;

#[async_trait]
impl Step for Upload {
    fn name(&self) -> &'static str {
        "upload"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        upload(ctx).await.into()
    }
}

async fn upload(ctx: &mut PublishContext<'_>) -> Result<()> {
    let url = match &ctx.upload {
        Some(target) => target.url.clone(),
        None => {
            return Err(PublishError::UploadError(
                "no upload target prepared".to_string(),
            ))
        }
    };

    ctx.say(
        events::UPLOAD_STARTED,
        format!("Uploading box: {}", ctx.box_path.display()),
    );
    ctx.message(
        events::UPLOAD_STARTED,
        "Depending on your internet connection and the size of the box,\nthis may take some time",
    );

    let ctx = &*ctx;
    let result = ctx
        .retry
        .run(
            &ctx.cancel,
            |attempt, err, delay| {
                tracing::warn!(attempt, error = %err, "Box upload attempt failed");
                ctx.message(
                    events::UPLOAD_RETRY,
                    format!(
                        "Error uploading box! Will retry in {} seconds. Error: {}",
                        delay.as_secs(),
                        err
                    ),
                );
            },
            |attempt| {
                tracing::debug!(attempt, url = %url, "Uploading box");
                ctx.message(events::UPLOAD_ATTEMPT, "Uploading box");
                ctx.transfer.put_file(&url, &ctx.box_path)
            },
        )
        .await;

    match result {
        Ok(()) => {
            ctx.message(events::UPLOAD_COMPLETED, "Box successfully uploaded");
            Ok(())
        }
        Err(err @ PublishError::Cancelled(_)) => Err(err),
        Err(err) => Err(PublishError::UploadError(err.to_string())),
    }
}
