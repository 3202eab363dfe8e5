//! boxpub Runtime - box publishing engine.
//!
//! This module provides the runtime implementation for boxpub, including box
//! archive inspection, the registry API client and the publish workflow.

#![allow(clippy::result_large_err)]

pub mod archive;
pub mod publish;
pub mod registry;

// Re-export common types
pub use archive::{read_box_metadata, BoxMetadata};
pub use publish::{BoxTransfer, HttpTransfer, Publisher, RetryPolicy, Step, StepAction};
pub use registry::{ApiError, ApiResult, BoxCoordinates, HttpRegistryClient, RegistryApi};

/// boxpub Runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
