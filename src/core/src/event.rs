use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event key type
pub type EventKey = String;

/// How prominently a message should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Headline progress line
    Say,
    /// Detail under the current headline
    Message,
    /// Problem that does not stop the run by itself
    Error,
}

/// Publish event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEvent {
    /// Event key (e.g., "box.created", "upload.retry")
    pub key: EventKey,

    pub level: EventLevel,

    /// Human readable text
    pub message: String,

    /// Timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl PublishEvent {
    /// Create a new event
    pub fn new(key: impl Into<String>, level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            level,
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Event emitter
#[derive(Clone)]
pub struct EventEmitter {
    sender: Arc<broadcast::Sender<PublishEvent>>,
}

impl EventEmitter {
    /// Create a new event emitter
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Emit an event. Dropped silently when nobody listens.
    pub fn emit(&self, event: PublishEvent) {
        tracing::debug!(key = %event.key, message = %event.message, "publish event");
        let _ = self.sender.send(event);
    }

    pub fn say(&self, key: &str, message: impl Into<String>) {
        self.emit(PublishEvent::new(key, EventLevel::Say, message));
    }

    pub fn message(&self, key: &str, message: impl Into<String>) {
        self.emit(PublishEvent::new(key, EventLevel::Message, message));
    }

    pub fn error(&self, key: &str, message: impl Into<String>) {
        self.emit(PublishEvent::new(key, EventLevel::Error, message));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Event catalog - predefined event keys
pub mod events {
    // Box events
    pub const BOX_FOUND: &str = "box.found";
    pub const BOX_CREATED: &str = "box.created";
    pub const BOX_WAITING: &str = "box.waiting";

    // Version events
    pub const VERSION_FOUND: &str = "version.found";
    pub const VERSION_CREATED: &str = "version.created";
    pub const VERSION_RELEASING: &str = "version.releasing";
    pub const VERSION_RELEASED: &str = "version.released";
    pub const VERSION_RELEASE_SKIPPED: &str = "version.release.skipped";

    // Provider events
    pub const PROVIDER_FOUND: &str = "provider.found";
    pub const PROVIDER_CREATED: &str = "provider.created";

    // Architecture events
    pub const ARCHITECTURE_UPDATED: &str = "architecture.updated";
    pub const ARCHITECTURE_CREATED: &str = "architecture.created";

    // Upload events
    pub const UPLOAD_PREPARING: &str = "upload.preparing";
    pub const UPLOAD_SIZE_LIMIT: &str = "upload.size_limit";
    pub const UPLOAD_STAT_FAILED: &str = "upload.stat_failed";
    pub const UPLOAD_STARTED: &str = "upload.started";
    pub const UPLOAD_ATTEMPT: &str = "upload.attempt";
    pub const UPLOAD_RETRY: &str = "upload.retry";
    pub const UPLOAD_COMPLETED: &str = "upload.completed";
    pub const UPLOAD_CONFIRMED: &str = "upload.confirmed";

    // Metadata events
    pub const METADATA_READING: &str = "metadata.reading";
}
