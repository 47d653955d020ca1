//! Notification transport - publish endpoints over a pub/sub service.
//!
//! Wraps an endpoint as a publisher: each call encodes the request into a
//! topic-addressed notification, runs the pre-send hooks, publishes through
//! the backend client, runs the post-send hooks, and returns the
//! backend-assigned message id.
//!
//! ```text
//! caller ──▶ Publisher::call(ctx, request)
//!              │ encode ──▶ Notification { topic, payload, structure }
//!              │ before hooks (ctx, &Notification)
//!              ▼
//!            NotifyClient::publish ──▶ PublishReceipt { message_id }
//!              │ after hooks (ctx, &PublishReceipt)
//!              ▼
//!            message_id
//! ```

mod in_memory;
mod notification;
mod publisher;

pub use in_memory::InMemoryNotifyClient;
pub use notification::{Notification, NotifyClient, PublishReceipt};
pub use publisher::{
    encode_json_notification, EncodeNotificationFn, Publisher, DEFAULT_PUBLISH_TIMEOUT,
};
