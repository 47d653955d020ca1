//! Codec function types and their JSON defaults.

use std::error::Error;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{BrokerMessage, BrokerWriter};
use crate::{Context, TransportError};

/// Encodes a request into an outbound broker message. Used on the
/// producer side.
pub type EncodeRequestFn<Req> =
    Arc<dyn Fn(&Context, &mut BrokerMessage, &Req) -> Result<(), TransportError> + Send + Sync>;

/// Extracts a domain request from an inbound broker message. Used on the
/// consumer side.
pub type DecodeRequestFn<Req> =
    Arc<dyn Fn(&Context, &BrokerMessage) -> Result<Req, TransportError> + Send + Sync>;

/// Encodes an endpoint response onto the outbound writer. Used on the
/// consumer side.
pub type EncodeResponseFn<Resp> =
    Arc<dyn Fn(&Context, &dyn BrokerWriter, &Resp) -> Result<(), TransportError> + Send + Sync>;

/// Extracts a domain response from a broker message. Carried by producers
/// for request/response symmetry; broker writes have no synchronous reply,
/// so it only runs on a separate consumption path.
pub type DecodeResponseFn<Resp> =
    Arc<dyn Fn(&Context, &BrokerMessage) -> Result<Resp, TransportError> + Send + Sync>;

/// Post-invoke hook observing the outbound writer (not the response
/// value), after the endpoint returns but before the reply is encoded.
pub type WriterHook =
    Arc<dyn Fn(Context, &(dyn BrokerWriter + 'static)) -> Context + Send + Sync>;

/// Encodes an error to the consumer reply. Runs after the error handler
/// whenever any dispatch stage fails.
pub type ErrorEncoderFn =
    Arc<dyn Fn(&Context, &(dyn Error + 'static), &dyn BrokerWriter) + Send + Sync>;

/// Runs at the very end of every dispatch, success or failure, with the
/// final context and the original inbound message. The principal intended
/// use is request logging and auditing.
pub type FinalizerFn = Arc<dyn Fn(&Context, &BrokerMessage) + Send + Sync>;

/// Serialize the request as JSON into the message payload. A sensible
/// default for producers.
pub fn encode_json_request<Req: Serialize>(
    _ctx: &Context,
    message: &mut BrokerMessage,
    request: &Req,
) -> Result<(), TransportError> {
    message.payload =
        serde_json::to_vec(request).map_err(|e| TransportError::Encode(e.to_string()))?;
    Ok(())
}

/// Deserialize the message payload from JSON. The matching default for
/// consumers of [`encode_json_request`] payloads.
pub fn decode_json_request<Req: DeserializeOwned>(
    _ctx: &Context,
    message: &BrokerMessage,
) -> Result<Req, TransportError> {
    serde_json::from_slice(&message.payload).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Serialize the response as JSON and write it as one reply message. A
/// sensible default for consumers. The reply's destination is whatever
/// the writer is bound to.
pub fn encode_json_response<Resp: Serialize>(
    ctx: &Context,
    writer: &dyn BrokerWriter,
    response: &Resp,
) -> Result<(), TransportError> {
    let payload =
        serde_json::to_vec(response).map_err(|e| TransportError::Encode(e.to_string()))?;
    writer.write(ctx, BrokerMessage::default().with_payload(payload))
}

/// Decoder for messages that need no decoding; yields the unit request.
/// Useful for fire-and-forget, side-effect-only endpoints.
pub fn nop_request_decoder(
    _ctx: &Context,
    _message: &BrokerMessage,
) -> Result<(), TransportError> {
    Ok(())
}

#[derive(Serialize)]
struct ErrorReply<'a> {
    err: &'a str,
}

/// Write the error to the consumer reply as `{"err": <message>}`.
///
/// Failures while encoding or writing the reply are only logged, never
/// escalated.
pub fn default_error_encoder(
    ctx: &Context,
    err: &(dyn Error + 'static),
    writer: &dyn BrokerWriter,
) {
    let message = err.to_string();
    match serde_json::to_vec(&ErrorReply { err: &message }) {
        Ok(payload) => {
            if let Err(write_err) =
                writer.write(ctx, BrokerMessage::default().with_payload(payload))
            {
                tracing::warn!(error = %write_err, "writing error reply failed");
            }
        }
        Err(encode_err) => {
            tracing::warn!(error = %encode_err, "encoding error reply failed");
        }
    }
}
