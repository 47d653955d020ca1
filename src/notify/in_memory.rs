//! In-memory notification client for testing and single-process use.

use std::sync::{Arc, Mutex};

use super::{Notification, NotifyClient, PublishReceipt};
use crate::{Context, TransportError};

/// Notification client that records everything it publishes and hands out
/// sequential message ids (`msg-1`, `msg-2`, ...).
///
/// Thread-safe; clones share the same record.
#[derive(Clone, Default)]
pub struct InMemoryNotifyClient {
    published: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotifyClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications published so far, in order.
    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl NotifyClient for InMemoryNotifyClient {
    fn publish(
        &self,
        ctx: &Context,
        notification: &Notification,
    ) -> Result<PublishReceipt, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let mut published = self
            .published
            .lock()
            .map_err(|_| TransportError::Connection("notify client poisoned".into()))?;
        published.push(notification.clone());
        Ok(PublishReceipt {
            message_id: format!("msg-{}", published.len()),
        })
    }
}
