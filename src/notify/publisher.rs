//! Publisher adapter: invoke an endpoint-shaped call as a pub/sub publish.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{Notification, NotifyClient, PublishReceipt};
use crate::{hook, BoxError, Context, Endpoint, Hook, TransportError};

/// Default deadline for a single publish call.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Encodes a request into the outbound notification.
pub type EncodeNotificationFn<Req> =
    Arc<dyn Fn(&Context, &mut Notification, &Req) -> Result<(), TransportError> + Send + Sync>;

/// Publisher wraps a topic and a backend client and provides a callable
/// with the endpoint shape: `(ctx, request) -> (message_id, error)`.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use transport_rust::notify::{encode_json_notification, InMemoryNotifyClient, Publisher};
/// use transport_rust::Context;
///
/// let client = Arc::new(InMemoryNotifyClient::new());
/// let publisher = Publisher::new(Arc::clone(&client), "orders", encode_json_notification);
///
/// let id = publisher
///     .call(&Context::background(), serde_json::json!({"id": 42}))
///     .unwrap();
/// assert_eq!(id, "msg-1");
/// ```
pub struct Publisher<C, Req> {
    client: Arc<C>,
    topic: String,
    encode: EncodeNotificationFn<Req>,
    before: Vec<Hook<Notification>>,
    after: Vec<Hook<PublishReceipt>>,
    timeout: Duration,
}

impl<C: NotifyClient, Req> Publisher<C, Req> {
    /// Construct a publisher for a single topic.
    pub fn new(
        client: Arc<C>,
        topic: impl Into<String>,
        encode: impl Fn(&Context, &mut Notification, &Req) -> Result<(), TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            client,
            topic: topic.into(),
            encode: Arc::new(encode),
            before: Vec::new(),
            after: Vec::new(),
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Register a hook applied to the outgoing notification before it is
    /// published. Hooks run in registration order.
    pub fn before(mut self, hook: Hook<Notification>) -> Self {
        self.before.push(hook);
        self
    }

    /// Register a hook applied to the publish receipt after the backend
    /// has accepted the notification.
    pub fn after(mut self, hook: Hook<PublishReceipt>) -> Self {
        self.after.push(hook);
        self
    }

    /// Override the per-call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Publish one request and return the backend-assigned message id.
    ///
    /// Encode failure aborts before the backend is touched. Backend
    /// failure is returned as-is; nothing is retried.
    pub fn call(&self, ctx: &Context, request: Req) -> Result<String, TransportError> {
        let ctx = ctx.with_timeout(self.timeout);

        let mut notification = Notification::new(self.topic.clone());
        (self.encode)(&ctx, &mut notification, &request)?;

        let ctx = hook::apply(&self.before, ctx, &notification);

        let receipt = self.client.publish(&ctx, &notification)?;

        hook::apply(&self.after, ctx, &receipt);

        Ok(receipt.message_id)
    }
}

impl<C: NotifyClient, Req> Endpoint<Req, String> for Publisher<C, Req> {
    fn call(&self, ctx: &Context, request: Req) -> Result<String, BoxError> {
        Publisher::call(self, ctx, request).map_err(Into::into)
    }
}

/// Encode the request as a JSON payload and tag the notification as
/// carrying a structured payload. A sensible default for most services.
pub fn encode_json_notification<Req: Serialize>(
    _ctx: &Context,
    notification: &mut Notification,
    request: &Req,
) -> Result<(), TransportError> {
    let payload =
        serde_json::to_string(request).map_err(|e| TransportError::Encode(e.to_string()))?;
    notification.payload = payload;
    notification.structure = Some("json".to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::InMemoryNotifyClient;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn publishes_and_returns_the_backend_message_id() {
        let client = Arc::new(InMemoryNotifyClient::new());
        let publisher =
            Publisher::new(Arc::clone(&client), "orders", encode_json_notification);

        let id = publisher
            .call(&Context::background(), json!({"id": 42}))
            .unwrap();

        assert_eq!(id, "msg-1");
        let published = client.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "orders");
        assert_eq!(published[0].payload, r#"{"id":42}"#);
        assert_eq!(published[0].structure.as_deref(), Some("json"));
    }

    #[test]
    fn encode_failure_never_reaches_the_client() {
        let client = Arc::new(InMemoryNotifyClient::new());
        let publisher = Publisher::new(
            Arc::clone(&client),
            "orders",
            |_: &Context, _: &mut Notification, _: &u32| {
                Err(TransportError::Encode("nope".into()))
            },
        );

        let err = publisher.call(&Context::background(), 1).unwrap_err();
        assert!(matches!(err, TransportError::Encode(_)));
        assert!(client.published().is_empty());
    }

    #[test]
    fn hooks_run_in_order_around_the_publish() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let before_order = Arc::clone(&order);
        let after_order = Arc::clone(&order);
        let client = Arc::new(InMemoryNotifyClient::new());
        let publisher =
            Publisher::new(Arc::clone(&client), "orders", encode_json_notification)
                .before(Arc::new(move |ctx, n: &Notification| {
                    before_order.lock().unwrap().push("before");
                    ctx.with_value("topic", n.topic.clone())
                }))
                .after(Arc::new(move |ctx, receipt: &PublishReceipt| {
                    // Context values from the before hook are still visible.
                    assert!(ctx.value("topic").is_some());
                    after_order.lock().unwrap().push("after");
                    ctx.with_value("message-id", receipt.message_id.clone())
                }));

        publisher.call(&Context::background(), json!({})).unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["before", "after"]);
    }

    #[test]
    fn works_through_the_endpoint_trait() {
        let client = Arc::new(InMemoryNotifyClient::new());
        let publisher =
            Publisher::new(Arc::clone(&client), "orders", encode_json_notification);
        let endpoint: &dyn Endpoint<serde_json::Value, String> = &publisher;

        let id = endpoint.call(&Context::background(), json!({"ok": true})).unwrap();
        assert_eq!(id, "msg-1");
    }
}
