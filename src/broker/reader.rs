//! Reader contract for the underlying broker client.

use super::BrokerMessage;
use crate::{Context, TransportError};

/// Trait for reading messages from the broker.
pub trait BrokerReader: Send + Sync {
    /// Block until one message is available, the context is cancelled, or
    /// its deadline passes.
    fn read(&self, ctx: &Context) -> Result<BrokerMessage, TransportError>;
}
