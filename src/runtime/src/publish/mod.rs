//! Publish workflow engine.
//!
//! A run is an ordered list of [`Step`]s sharing one [`PublishContext`].
//! Each step reconciles one piece of registry state and either continues or
//! halts the run:
//!
//! ```text
//! create-box → create-version → create-provider → create-architecture
//!     → [prepare-upload → upload → confirm-upload] → release-version
//! ```
//!
//! The bracketed upload steps are skipped when the box is hosted at an
//! external download URL.

pub mod context;
pub mod publisher;
pub mod retry;
pub mod step;
pub mod steps;
pub mod transfer;

pub use context::{PublishContext, UploadTarget};
pub use publisher::{render_download_url, Publisher};
pub use retry::RetryPolicy;
pub use step::{run_steps, Step, StepAction};
pub use transfer::{BoxTransfer, HttpTransfer};
