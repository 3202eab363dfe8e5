//! Ensure the box exists, creating it and waiting for provisioning if not.

use std::time::Duration;

use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};
use boxpub_core::event::events;

use crate::publish::context::PublishContext;
use crate::publish::step::{Step, StepAction};
use crate::registry::{BoxRecord, CreateBoxResponse, OperationState};

/// Default server-side wait for a new box to become available.
pub const BOX_CREATE_TIMEOUT: Duration = Duration::from_secs(60);

pub struct CreateBox;

#[async_trait]
impl Step for CreateBox {
    fn name(&self) -> &'static str {
        "create-box"
    }

    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction {
        ensure_box(ctx).await.into()
    }
}

async fn ensure_box(ctx: &mut PublishContext<'_>) -> Result<()> {
    let tag = &ctx.config.tag;

    match ctx.guard(ctx.api.read_box(&ctx.coordinates)).await? {
        Ok(()) => {
            ctx.say(
                events::BOX_FOUND,
                format!("Found box and verified accessible: {}", tag),
            );
            return Ok(());
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err.into_publish_error("Failure retrieving box")),
    }

    tracing::info!(
        registry = %ctx.coordinates.registry,
        box_name = %ctx.coordinates.box_name,
        "Box not found, creating"
    );

    let record = BoxRecord {
        name: ctx.coordinates.box_name.clone(),
        description: ctx.config.box_description.clone(),
        is_private: ctx.config.box_private,
    };
    let response = ctx
        .guard(ctx.api.create_box(&ctx.coordinates, &record))
        .await?
        .map_err(|e| match e.into_publish_error("Failure creating new box") {
            PublishError::RegistryError { context, message } => PublishError::RegistryError {
                context,
                message: format!("{} - Please try again.", message),
            },
            other => other,
        })?;

    ctx.say(events::BOX_CREATED, format!("Created new box: {}", tag));
    ctx.message(events::BOX_WAITING, "Waiting for box to become available...");

    wait_for_box(ctx, response).await
}

async fn wait_for_box(ctx: &PublishContext<'_>, response: CreateBoxResponse) -> Result<()> {
    // The wait call is addressed by the operation location
    let (operation, location) = response
        .operation
        .and_then(|op| op.location.clone().map(|location| (op, location)))
        .ok_or_else(|| {
            PublishError::OperationError(
                "Unable to wait for box to become available - Please check the registry for box \
                 status, and try again."
                    .to_string(),
            )
        })?;

    let waited = ctx
        .guard(
            ctx.api
                .wait_operation(&operation.id, &location, ctx.box_create_timeout),
        )
        .await?
        .map_err(|e| {
            PublishError::OperationError(format!(
                "Unexpected failure waiting for box to become available: {} - Please try again.",
                e.message()
            ))
        })?;

    let operation = waited.operation.ok_or_else(|| {
        PublishError::OperationError(
            "Unable to check box creation operation status - Please check the registry for box \
             status, and try again."
                .to_string(),
        )
    })?;

    if let Some(error) = operation.error {
        return Err(PublishError::OperationError(format!(
            "Box creation operation reported a failure: {} - Please try again.",
            error.message
        )));
    }

    if operation.state != Some(OperationState::Done) {
        return Err(PublishError::OperationError(
            "Timeout exceeded waiting for box to become available - Please verify box creation \
             in the registry and try again."
                .to_string(),
        ));
    }

    tracing::debug!(operation = %operation.id, "Box creation operation completed");
    Ok(())
}
