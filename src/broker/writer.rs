//! Writer contract for the underlying broker client.

use super::BrokerMessage;
use crate::{Context, TransportError};

/// Trait for writing messages to the broker.
///
/// The writer handle is long-lived, shared across calls, and assumed safe
/// for concurrent use; this layer neither pools nor synchronizes access.
pub trait BrokerWriter: Send + Sync {
    /// Write one message, honoring the context's deadline and
    /// cancellation. A successful write acknowledges durability only.
    fn write(&self, ctx: &Context, message: BrokerMessage) -> Result<(), TransportError>;
}
