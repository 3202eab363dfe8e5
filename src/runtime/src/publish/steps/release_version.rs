use async_trait::async_trait;
use boxpub_core::error::Result;
use boxpub_core::event::events;

use crate::publish::context::PublishContext;
use crate::publish::step::{Step, StepAction};
use crate::registry::{VersionRecord, VersionState};

/// Release the version when allowed and still unreleased.
pub struct ReleaseVersion;

#[async_trait]
impl Step for ReleaseVersion {
    fn name(&self) -> &'static str {
        "release-version"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        release(ctx).await.into()
    }
}

/// Only an explicit `UNRELEASED` state is released; a missing state is left alone.
pub fn should_release(no_release: bool, version: Option<&VersionRecord>) -> bool {
    !no_release && version.and_then(|v| v.state) == Some(VersionState::Unreleased)
}

async fn release(ctx: &mut PublishContext<'_>) -> Result<()> {
    if ctx.config.no_release {
        ctx.message(
            events::VERSION_RELEASE_SKIPPED,
            "Not releasing version due to configuration",
        );
        return Ok(());
    }

    if !should_release(ctx.config.no_release, ctx.version.as_ref()) {
        ctx.message(
            events::VERSION_RELEASE_SKIPPED,
            "Version not in unreleased state, skipping release",
        );
        return Ok(());
    }

    ctx.say(
        events::VERSION_RELEASING,
        format!("Releasing version: {}", ctx.coordinates.version),
    );

    ctx.guard(ctx.api.release_version(&ctx.coordinates))
        .await?
        .map_err(|e| e.into_publish_error("Failure releasing version"))?;

    tracing::info!(version = %ctx.coordinates.version, "Version released");
    ctx.message(
        events::VERSION_RELEASED,
        "Version successfully released and available",
    );
    Ok(())
}
