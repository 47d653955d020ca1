//! Outbound notification envelope and the backend client contract.

use crate::{Context, TransportError};

/// A notification to be published to a pub/sub topic.
///
/// Constructed fresh per call, owned exclusively by the call that built
/// it, and discarded after send.
#[derive(Clone, Debug)]
pub struct Notification {
    /// Destination topic or channel address.
    pub topic: String,
    /// Serialized payload.
    pub payload: String,
    /// Structural tag for self-describing payloads (e.g. "json").
    /// `None` means the payload is opaque.
    pub structure: Option<String>,
}

impl Notification {
    /// Create an empty notification addressed to a topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: String::new(),
            structure: None,
        }
    }
}

/// What the backend returns for a successful publish.
#[derive(Clone, Debug)]
pub struct PublishReceipt {
    /// Unique id the backend assigned to the published message.
    pub message_id: String,
}

/// Client contract for the underlying pub/sub notification service.
///
/// The client handle is long-lived, shared across calls, and assumed safe
/// for concurrent use; this layer is a direct pass-through.
pub trait NotifyClient: Send + Sync {
    /// Publish a notification, honoring the context's deadline and
    /// cancellation.
    fn publish(
        &self,
        ctx: &Context,
        notification: &Notification,
    ) -> Result<PublishReceipt, TransportError>;
}
