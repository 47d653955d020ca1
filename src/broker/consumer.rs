//! Consumer adapter: drive an endpoint from inbound broker messages.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{
    default_error_encoder, BrokerMessage, BrokerReader, BrokerWriter, DecodeRequestFn,
    EncodeResponseFn, ErrorEncoderFn, FinalizerFn, WriterHook,
};
use crate::{
    hook, BoxError, Context, Endpoint, ErrorHandler, Hook, NopErrorHandler, TransportError,
};

/// Initial delay before retrying a failed read.
const READ_RETRY_MIN: Duration = Duration::from_millis(50);
/// Ceiling for the read-retry backoff.
const READ_RETRY_MAX: Duration = Duration::from_secs(5);

/// Consumer wraps an endpoint and dispatches one inbound broker message
/// at a time through it, writing the response (or an encoded error) back
/// via the outbound writer.
///
/// Every failure in the dispatch path is routed to the error handler
/// (diagnostics only) and the error encoder (best-effort reply); nothing
/// propagates to the caller.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use transport_rust::broker::{
///     encode_json_response, nop_request_decoder, BrokerMessage, Consumer, InMemoryBroker,
/// };
/// use transport_rust::{BoxError, Context};
///
/// fn handler(_ctx: &Context, _req: ()) -> Result<serde_json::Value, BoxError> {
///     Ok(serde_json::json!({"ok": true}))
/// }
///
/// let consumer = Consumer::new(handler, nop_request_decoder, encode_json_response);
/// let replies = InMemoryBroker::new();
/// consumer.handle_msg(BrokerMessage::new("commands"), &replies);
/// assert_eq!(replies.written()[0].payload_str(), Some(r#"{"ok":true}"#));
/// ```
pub struct Consumer<Req, Resp> {
    endpoint: Arc<dyn Endpoint<Req, Resp>>,
    decode: DecodeRequestFn<Req>,
    encode: EncodeResponseFn<Resp>,
    before: Vec<Hook<BrokerMessage>>,
    after: Vec<WriterHook>,
    finalizers: Vec<FinalizerFn>,
    error_handler: Arc<dyn ErrorHandler>,
    error_encoder: ErrorEncoderFn,
}

impl<Req, Resp> Consumer<Req, Resp> {
    /// Construct a consumer around an endpoint and a request/response
    /// codec pair.
    ///
    /// Defaults, fixed at build time: errors are discarded by
    /// [`NopErrorHandler`] and encoded to the reply by
    /// [`default_error_encoder`].
    pub fn new(
        endpoint: impl Endpoint<Req, Resp> + 'static,
        decode: impl Fn(&Context, &BrokerMessage) -> Result<Req, TransportError>
            + Send
            + Sync
            + 'static,
        encode: impl Fn(&Context, &dyn BrokerWriter, &Resp) -> Result<(), TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            decode: Arc::new(decode),
            encode: Arc::new(encode),
            before: Vec::new(),
            after: Vec::new(),
            finalizers: Vec::new(),
            error_handler: Arc::new(NopErrorHandler),
            error_encoder: Arc::new(default_error_encoder),
        }
    }

    /// Register a hook applied to the inbound message before it is
    /// decoded. Hooks run in registration order.
    pub fn before(mut self, hook: Hook<BrokerMessage>) -> Self {
        self.before.push(hook);
        self
    }

    /// Register a hook applied after the endpoint returns, before the
    /// reply is encoded. After hooks observe the outbound writer, not the
    /// response value.
    pub fn after(mut self, hook: WriterHook) -> Self {
        self.after.push(hook);
        self
    }

    /// Register a finalizer, invoked at the end of every dispatch with
    /// the final context and the original inbound message, regardless of
    /// outcome. None are registered by default.
    pub fn finalizer(mut self, finalizer: FinalizerFn) -> Self {
        self.finalizers.push(finalizer);
        self
    }

    /// Replace the error encoder used to produce reply-side error
    /// payloads.
    pub fn error_encoder(
        mut self,
        encoder: impl Fn(&Context, &(dyn std::error::Error + 'static), &dyn BrokerWriter)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.error_encoder = Arc::new(encoder);
        self
    }

    /// Replace the diagnostic error sink.
    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Dispatch one inbound message through the endpoint.
    ///
    /// The per-message context is cancelled deterministically when this
    /// returns, on every path. Finalizers, if any, always run last.
    pub fn handle_msg(&self, message: BrokerMessage, writer: &(dyn BrokerWriter + 'static)) {
        let (ctx, _canceller) = Context::background().cancellable();

        let ctx = self.dispatch(ctx, &message, writer);

        for finalizer in &self.finalizers {
            finalizer(&ctx, &message);
        }
        // _canceller drops here, cancelling the per-message context.
    }

    /// Read messages from `reader` and dispatch each via
    /// [`Consumer::handle_msg`] until `ctx` is cancelled.
    ///
    /// A read error goes to the error handler and the loop retries the
    /// next read after an exponential backoff, reset on the next
    /// successful read. Dispatch is strictly serial; running multiple
    /// loops over partitions is the owner's concern.
    pub fn run(
        &self,
        ctx: &Context,
        reader: &dyn BrokerReader,
        writer: &(dyn BrokerWriter + 'static),
    ) {
        let mut retry = READ_RETRY_MIN;
        loop {
            if ctx.is_cancelled() {
                return;
            }
            match reader.read(ctx) {
                Ok(message) => {
                    retry = READ_RETRY_MIN;
                    self.handle_msg(message, writer);
                }
                Err(err) => {
                    self.error_handler.handle(ctx, &err);
                    if ctx.is_cancelled() {
                        return;
                    }
                    thread::sleep(retry);
                    retry = (retry * 2).min(READ_RETRY_MAX);
                }
            }
        }
    }

    /// The linear per-message pipeline. Returns the final context so the
    /// finalizers observe everything the hooks accumulated.
    fn dispatch(
        &self,
        ctx: Context,
        message: &BrokerMessage,
        writer: &(dyn BrokerWriter + 'static),
    ) -> Context {
        let ctx = hook::apply(&self.before, ctx, message);

        let request = match (self.decode)(&ctx, message) {
            Ok(request) => request,
            Err(err) => return self.fail(ctx, err.into(), writer),
        };

        let response = match self.endpoint.call(&ctx, request) {
            Ok(response) => response,
            Err(err) => return self.fail(ctx, err, writer),
        };

        let ctx = hook::apply(&self.after, ctx, writer);

        if let Err(err) = (self.encode)(&ctx, writer, &response) {
            return self.fail(ctx, err.into(), writer);
        }

        ctx
    }

    /// Error stage: diagnostic sink first, then the reply-side encoder,
    /// then stop. No further stages run.
    fn fail(&self, ctx: Context, err: BoxError, writer: &dyn BrokerWriter) -> Context {
        self.error_handler.handle(&ctx, &*err);
        (self.error_encoder)(&ctx, &*err, writer);
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{
        decode_json_request, encode_json_response, nop_request_decoder, InMemoryBroker,
    };
    use crate::LogErrorHandler;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn ok_handler(_ctx: &Context, _req: ()) -> Result<Value, BoxError> {
        Ok(json!({"ok": true}))
    }

    fn boom_handler(_ctx: &Context, _req: ()) -> Result<Value, BoxError> {
        Err("boom".into())
    }

    #[test]
    fn happy_path_writes_the_response_and_skips_the_error_sinks() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let consumer = Consumer::new(ok_handler, nop_request_decoder, encode_json_response)
            .error_handler(LogErrorHandler::with_buffer(Arc::clone(&errors)));

        let replies = InMemoryBroker::new();
        consumer.handle_msg(BrokerMessage::new("commands"), &replies);

        assert_eq!(replies.written().len(), 1);
        assert_eq!(
            replies.written()[0].payload_str(),
            Some(r#"{"ok":true}"#)
        );
        assert!(errors.lock().unwrap().is_empty());
    }

    #[test]
    fn handler_error_reaches_both_sinks() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let consumer = Consumer::new(boom_handler, nop_request_decoder, encode_json_response)
            .error_handler(LogErrorHandler::with_buffer(Arc::clone(&errors)));

        let replies = InMemoryBroker::new();
        consumer.handle_msg(BrokerMessage::new("commands"), &replies);

        assert_eq!(
            replies.written()[0].payload_str(),
            Some(r#"{"err":"boom"}"#)
        );
        assert_eq!(*errors.lock().unwrap(), vec!["boom".to_string()]);
    }

    #[test]
    fn decode_failure_skips_the_endpoint() {
        let invoked = Arc::new(Mutex::new(0u32));
        let invoked_in_handler = Arc::clone(&invoked);
        let endpoint = move |_ctx: &Context, _req: Value| -> Result<Value, BoxError> {
            *invoked_in_handler.lock().unwrap() += 1;
            Ok(json!({}))
        };

        let consumer =
            Consumer::new(endpoint, decode_json_request::<Value>, encode_json_response);

        let replies = InMemoryBroker::new();
        consumer.handle_msg(
            BrokerMessage::new("commands").with_payload("{not json"),
            &replies,
        );

        assert_eq!(*invoked.lock().unwrap(), 0);
        let reply = replies.written();
        assert!(reply[0]
            .payload_str()
            .unwrap()
            .starts_with(r#"{"err":"decode failed"#));
    }

    #[test]
    fn finalizers_always_run_with_the_original_message() {
        let finalized = Arc::new(Mutex::new(Vec::new()));
        let finalized_in_hook = Arc::clone(&finalized);

        let consumer =
            Consumer::new(boom_handler, nop_request_decoder, encode_json_response).finalizer(
                Arc::new(move |_ctx, message: &BrokerMessage| {
                    finalized_in_hook
                        .lock()
                        .unwrap()
                        .push(message.topic.clone());
                }),
            );

        let replies = InMemoryBroker::new();
        consumer.handle_msg(BrokerMessage::new("commands"), &replies);

        assert_eq!(*finalized.lock().unwrap(), vec!["commands".to_string()]);
    }

    #[test]
    fn before_hook_values_are_visible_to_finalizers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_finalizer = Arc::clone(&seen);

        let consumer = Consumer::new(ok_handler, nop_request_decoder, encode_json_response)
            .before(Arc::new(|ctx, message: &BrokerMessage| {
                ctx.with_value("topic", message.topic.clone())
            }))
            .after(Arc::new(|ctx, _writer| {
                assert!(ctx.value("topic").is_some());
                ctx.with_value("replied", true)
            }))
            .finalizer(Arc::new(move |ctx, _message| {
                seen_in_finalizer.lock().unwrap().push((
                    ctx.value("topic").cloned(),
                    ctx.value("replied").cloned(),
                ));
            }));

        let replies = InMemoryBroker::new();
        consumer.handle_msg(BrokerMessage::new("commands"), &replies);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, Some(json!("commands")));
        assert_eq!(seen[0].1, Some(json!(true)));
    }

    #[test]
    fn custom_error_encoder_replaces_the_default() {
        let consumer = Consumer::new(boom_handler, nop_request_decoder, encode_json_response)
            .error_encoder(|ctx: &Context, err, writer: &dyn BrokerWriter| {
                let payload = format!("failed: {}", err);
                let _ = writer.write(ctx, BrokerMessage::default().with_payload(payload));
            });

        let replies = InMemoryBroker::new();
        consumer.handle_msg(BrokerMessage::new("commands"), &replies);

        assert_eq!(replies.written()[0].payload_str(), Some("failed: boom"));
    }
}
