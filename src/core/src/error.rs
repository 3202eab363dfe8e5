use thiserror::Error;

/// boxpub error types
#[derive(Error, Debug)]
pub enum PublishError {
    /// One or more configuration problems, detected before any network call
    #[error("Configuration error: {}", .0.join("; "))]
    ConfigError(Vec<String>),

    /// Input artifact is not something this tool can publish
    #[error("{0}")]
    ArtifactError(String),

    /// Box archive could not be read or its metadata is incomplete
    #[error("{0}")]
    MetadataError(String),

    /// The registry answered with a non-success status
    #[error("{context}: {message}")]
    RegistryError { context: String, message: String },

    /// A registry call failed without a structured response
    #[error("Unexpected client error: {0}")]
    UnexpectedClientError(String),

    /// A successful response was missing a required body
    #[error("Invalid response body for {0}")]
    InvalidResponse(String),

    /// Long-running registry operation did not complete cleanly
    #[error("{0}")]
    OperationError(String),

    /// Box transfer failed after exhausting retries
    #[error("Failed to upload box asset: {0}")]
    UploadError(String),

    /// Run aborted by the caller
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl PublishError {
    /// Build a single-message configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PublishError::ConfigError(vec![message.into()])
    }

    /// Build a registry error for a failed call.
    pub fn registry(context: impl Into<String>, message: impl Into<String>) -> Self {
        PublishError::RegistryError {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for PublishError {
    fn from(err: serde_yaml::Error) -> Self {
        PublishError::SerializationError(err.to_string())
    }
}

/// Result type alias for boxpub operations
pub type Result<T> = std::result::Result<T, PublishError>;
