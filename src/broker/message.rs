//! Broker message envelope.

/// A message as written to or read from the broker.
///
/// Outbound messages carry a topic (bound by the producer) and a payload;
/// `partition` and `offset` are broker-assigned and only meaningful on
/// inbound messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrokerMessage {
    /// Destination topic. Empty on reply messages, where the writer
    /// itself is bound to a destination.
    pub topic: String,
    /// Optional partitioning key.
    pub key: Option<Vec<u8>>,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Broker-assigned partition (inbound only).
    pub partition: u32,
    /// Broker-assigned offset (inbound only).
    pub offset: u64,
}

impl BrokerMessage {
    /// Create an empty message bound to a topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Set the partitioning key.
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the payload bytes.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// The payload as a string, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}
