//! Producer adapter: invoke an endpoint-shaped call as a broker write.

use std::sync::Arc;
use std::time::Duration;

use super::{BrokerMessage, BrokerWriter, DecodeResponseFn, EncodeRequestFn};
use crate::{hook, BoxError, Context, Endpoint, Hook, TransportError};

/// Default deadline for a single write call.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Producer wraps a topic and a broker writer and provides a callable
/// with the endpoint shape: `(ctx, request) -> ((), error)`.
///
/// A broker write acknowledges durability, not application-level
/// processing, so the call always yields a unit result; any response must
/// come through a separate consumption path.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use transport_rust::broker::{
///     decode_json_request, encode_json_request, InMemoryBroker, Producer,
/// };
/// use transport_rust::Context;
///
/// let broker = Arc::new(InMemoryBroker::new());
/// let producer = Producer::new(
///     Arc::clone(&broker),
///     "orders",
///     encode_json_request,
///     decode_json_request::<serde_json::Value>,
/// );
///
/// producer
///     .call(&Context::background(), serde_json::json!({"id": 42}))
///     .unwrap();
/// assert_eq!(broker.written()[0].payload_str(), Some(r#"{"id":42}"#));
/// ```
pub struct Producer<W, Req, Resp = serde_json::Value> {
    writer: Arc<W>,
    topic: String,
    encode: EncodeRequestFn<Req>,
    decode: DecodeResponseFn<Resp>,
    before: Vec<Hook<BrokerMessage>>,
    after: Vec<Hook<BrokerMessage>>,
    timeout: Duration,
}

impl<W: BrokerWriter, Req, Resp> Producer<W, Req, Resp> {
    /// Construct a producer for a single topic.
    ///
    /// The response decoder is carried for symmetry with request/response
    /// transports; the send path never invokes it (see
    /// [`Producer::response_decoder`]).
    pub fn new(
        writer: Arc<W>,
        topic: impl Into<String>,
        encode: impl Fn(&Context, &mut BrokerMessage, &Req) -> Result<(), TransportError>
            + Send
            + Sync
            + 'static,
        decode: impl Fn(&Context, &BrokerMessage) -> Result<Resp, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            writer,
            topic: topic.into(),
            encode: Arc::new(encode),
            decode: Arc::new(decode),
            before: Vec::new(),
            after: Vec::new(),
            timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Register a hook applied to the outgoing message before it is
    /// written. Hooks run in registration order.
    pub fn before(mut self, hook: Hook<BrokerMessage>) -> Self {
        self.before.push(hook);
        self
    }

    /// Register a hook applied after the write. Since broker writes have
    /// no reply, after hooks observe the message that was sent.
    pub fn after(mut self, hook: Hook<BrokerMessage>) -> Self {
        self.after.push(hook);
        self
    }

    /// Override the per-call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The response decoder this producer was configured with.
    ///
    /// Useful for the reply-side consumer of a request/response pair that
    /// wants to share one codec configuration.
    pub fn response_decoder(&self) -> &DecodeResponseFn<Resp> {
        &self.decode
    }

    /// Write one request to the topic. Always yields a unit result.
    ///
    /// Encode failure aborts before the writer is touched. Write failure
    /// is returned as-is; nothing is retried.
    pub fn call(&self, ctx: &Context, request: Req) -> Result<(), TransportError> {
        let ctx = ctx.with_timeout(self.timeout);

        let mut message = BrokerMessage::new(self.topic.clone());
        (self.encode)(&ctx, &mut message, &request)?;

        let ctx = hook::apply(&self.before, ctx, &message);

        self.writer.write(&ctx, message.clone())?;

        hook::apply(&self.after, ctx, &message);

        Ok(())
    }
}

impl<W: BrokerWriter, Req, Resp> Endpoint<Req, ()> for Producer<W, Req, Resp> {
    fn call(&self, ctx: &Context, request: Req) -> Result<(), BoxError> {
        Producer::call(self, ctx, request).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{decode_json_request, encode_json_request, InMemoryBroker};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[test]
    fn writes_the_encoded_request_to_the_topic() {
        let broker = Arc::new(InMemoryBroker::new());
        let producer = Producer::new(
            Arc::clone(&broker),
            "orders",
            encode_json_request,
            decode_json_request::<Value>,
        );

        producer
            .call(&Context::background(), json!({"id": 42}))
            .unwrap();

        let written = broker.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].topic, "orders");
        assert_eq!(written[0].payload_str(), Some(r#"{"id":42}"#));
    }

    #[test]
    fn encode_failure_never_reaches_the_writer() {
        let broker = Arc::new(InMemoryBroker::new());
        let producer = Producer::new(
            Arc::clone(&broker),
            "orders",
            |_: &Context, _: &mut BrokerMessage, _: &u32| {
                Err(TransportError::Encode("nope".into()))
            },
            decode_json_request::<Value>,
        );

        let err = producer.call(&Context::background(), 1).unwrap_err();
        assert!(matches!(err, TransportError::Encode(_)));
        assert!(broker.written().is_empty());
    }

    #[test]
    fn after_hooks_observe_the_sent_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = Arc::clone(&seen);

        let broker = Arc::new(InMemoryBroker::new());
        let producer = Producer::new(
            Arc::clone(&broker),
            "orders",
            encode_json_request,
            decode_json_request::<Value>,
        )
        .after(Arc::new(move |ctx, message: &BrokerMessage| {
            seen_in_hook
                .lock()
                .unwrap()
                .push(message.payload_str().unwrap_or_default().to_string());
            ctx
        }));

        producer
            .call(&Context::background(), json!({"id": 1}))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![r#"{"id":1}"#.to_string()]);
    }

    #[test]
    fn response_decoder_round_trips_the_written_payload() {
        let broker = Arc::new(InMemoryBroker::new());
        let producer = Producer::new(
            Arc::clone(&broker),
            "orders",
            encode_json_request,
            decode_json_request::<Value>,
        );

        let ctx = Context::background();
        producer.call(&ctx, json!({"id": 42})).unwrap();

        let written = broker.written();
        let decoded = (producer.response_decoder())(&ctx, &written[0]).unwrap();
        assert_eq!(decoded, json!({"id": 42}));
    }
}
