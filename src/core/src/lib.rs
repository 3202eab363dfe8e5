//! boxpub Core - Foundational Types
//!
//! Errors, configuration resolution, artifact types and the event channel
//! shared by the boxpub runtime and CLI.

pub mod artifact;
pub mod config;
pub mod error;
pub mod event;

// Re-export commonly used types
pub use artifact::{BuilderKind, InputArtifact, PublishedArtifact};
pub use config::{ApiConfig, BoxTag, Checksum, PublishConfig, PublishSettings};
pub use error::{PublishError, Result};
pub use event::{EventEmitter, EventLevel, PublishEvent};

/// boxpub version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
