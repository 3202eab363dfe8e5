//! Step abstraction and the sequential runner.

use async_trait::async_trait;
use boxpub_core::error::{PublishError, Result};

use super::context::PublishContext;

/// Outcome of a single step.
#[derive(Debug)]
pub enum StepAction {
    Continue,
    Halt(PublishError),
}

impl From<Result<()>> for StepAction {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => StepAction::Continue,
            Err(err) => StepAction::Halt(err),
        }
    }
}

/// One stage of the publish workflow.
#[async_trait]
pub trait Step: Send + Sync {
    /// Step name (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Run the step against the shared context
    async fn run(&self, ctx: &mut PublishContext<'_>) -> StepAction;
}

/// Run `steps` in order, stopping at the first halt.
///
/// Cancellation is checked before every step. The halting step's error is
/// returned as-is.
pub async fn run_steps(steps: &[Box<dyn Step>], ctx: &mut PublishContext<'_>) -> Result<()> {
    for step in steps {
        let action = if ctx.cancel.is_cancelled() {
            StepAction::Halt(PublishError::Cancelled(format!(
                "publish run cancelled before {}",
                step.name()
            )))
        } else {
            tracing::debug!(step = step.name(), "Running publish step");
            step.run(ctx).await
        };

        if let StepAction::Halt(err) = action {
            tracing::warn!(step = step.name(), error = %err, "Publish step halted");
            return Err(err);
        }
    }

    Ok(())
}
