use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::events;

use crate::publish::context::PublishContext;
use crate::publish::step::{Step, StepAction};
use crate::registry::VersionRecord;

/// Ensure the version exists and remember its release state.
pub struct CreateVersion;

#[async_trait]
impl Step for CreateVersion {
    fn name(&self) -> &'static str {
        "create-version"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        ensure_version(ctx).await.into()
    }
}

async fn ensure_version(ctx: &mut PublishContext<'_>) -> Result<()> {
    match ctx.guard(ctx.api.read_version(&ctx.coordinates)).await? {
        Ok(response) => {
            let version = response.version.ok_or_else(|| {
                PublishError::InvalidResponse("version read".to_string())
            })?;
            ctx.message(events::VERSION_FOUND, "Version exists, skipping creation");
            ctx.version = Some(version);
            return Ok(());
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err.into_publish_error("Failure retrieving version")),
    }

    let record = VersionRecord {
        name: ctx.coordinates.version.clone(),
        description: ctx.config.version_description.clone(),
        state: None,
    };
    let response = ctx
        .guard(ctx.api.create_version(&ctx.coordinates, &record))
        .await?
        .map_err(|e| e.into_publish_error("Failure creating new version"))?;

    let version = response
        .version
        .ok_or_else(|| PublishError::InvalidResponse("version create".to_string()))?;

    tracing::info!(version = %ctx.coordinates.version, state = ?version.state, "Created version");
    ctx.message(
        events::VERSION_CREATED,
        format!("Created new version: {}", ctx.coordinates.version),
    );
    ctx.version = Some(version);
    Ok(())
}
