//! In-memory broker for testing and single-process use.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::{BrokerMessage, BrokerReader, BrokerWriter};
use crate::{Context, TransportError};

/// How often a blocked read re-checks the queue and the context.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A queue-backed broker implementing both [`BrokerWriter`] and
/// [`BrokerReader`].
///
/// Thread-safe; clones share the same queue, so one handle can act as a
/// producer's writer while another drives a consumer's read loop. Offsets
/// are assigned on write. Every written message is also retained in an
/// append-only record for test assertions.
///
/// ## Example
///
/// ```
/// use transport_rust::broker::{BrokerMessage, BrokerReader, BrokerWriter, InMemoryBroker};
/// use transport_rust::Context;
///
/// let broker = InMemoryBroker::new();
/// let ctx = Context::background();
///
/// broker
///     .write(&ctx, BrokerMessage::new("orders").with_payload("{}"))
///     .unwrap();
/// let message = broker.read(&ctx).unwrap();
/// assert_eq!(message.topic, "orders");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    queue: Arc<Mutex<VecDeque<BrokerMessage>>>,
    written: Arc<Mutex<Vec<BrokerMessage>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages written so far, in order, with assigned offsets.
    pub fn written(&self) -> Vec<BrokerMessage> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl BrokerWriter for InMemoryBroker {
    fn write(&self, ctx: &Context, mut message: BrokerMessage) -> Result<(), TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| TransportError::Connection("broker queue poisoned".into()))?;
        let mut written = self
            .written
            .lock()
            .map_err(|_| TransportError::Connection("broker record poisoned".into()))?;

        message.offset = written.len() as u64;
        queue.push_back(message.clone());
        written.push(message);
        Ok(())
    }
}

impl BrokerReader for InMemoryBroker {
    fn read(&self, ctx: &Context) -> Result<BrokerMessage, TransportError> {
        loop {
            if let Some(deadline) = ctx.deadline() {
                if Instant::now() >= deadline {
                    return Err(TransportError::Timeout);
                }
            }
            if ctx.is_cancelled() {
                return Err(TransportError::Cancelled);
            }
            {
                let mut queue = self
                    .queue
                    .lock()
                    .map_err(|_| TransportError::Connection("broker queue poisoned".into()))?;
                if let Some(message) = queue.pop_front() {
                    return Ok(message);
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}
