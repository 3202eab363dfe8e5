use async_trait::async_trait;
use boxpub_core::error::Result;
use boxpub_core::event::events;

use crate::publish::context::PublishContext;
use crate::publish::step::{Step, StepAction};
use crate::registry::ProviderRecord;

/// Ensure the provider exists under the version.
pub struct CreateProvider;

#[async_trait]
impl Step for CreateProvider {
    fn name(&self) -> &'static str {
        "create-provider"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        ensure_provider(ctx).await.into()
    }
}

async fn ensure_provider(ctx: &mut PublishContext<'_>) -> Result<()> {
    match ctx.guard(ctx.api.read_provider(&ctx.coordinates)).await? {
        Ok(()) => {
            ctx.message(events::PROVIDER_FOUND, "Provider exists, skipping creation");
            return Ok(());
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err.into_publish_error("Failure retrieving provider")),
    }

    let record = ProviderRecord {
        name: ctx.coordinates.provider.clone(),
    };
    ctx.guard(ctx.api.create_provider(&ctx.coordinates, &record))
        .await?
        .map_err(|e| e.into_publish_error("Failure creating new provider"))?;

    ctx.message(
        events::PROVIDER_CREATED,
        format!("Created new provider: {}", ctx.coordinates.provider),
    );
    Ok(())
}
