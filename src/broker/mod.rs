//! Broker transport - producer and consumer adapters over a topic-based,
//! log-structured message broker.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Producer (send side)                                         │
//! │   call(ctx, request)                                         │
//! │     encode ─▶ before hooks ─▶ BrokerWriter::write            │
//! │     ─▶ after hooks (over the sent message) ─▶ ()             │
//! └──────────────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Consumer (receive side)                                      │
//! │   run(ctx, reader, writer)        blocking read loop         │
//! │     └▶ handle_msg(message, writer)   one linear dispatch     │
//! │          before hooks ─▶ decode ─▶ endpoint ─▶ after hooks   │
//! │          ─▶ encode reply                                     │
//! │          any failure ─▶ error handler + error encoder        │
//! │          finalizers always run last                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Broker writes acknowledge durability, not application-level
//! processing, so a producer call never yields a response payload; any
//! reply must arrive through a separate consumption path.

mod codec;
mod consumer;
mod in_memory;
mod message;
mod producer;
mod reader;
mod writer;

pub use codec::{
    decode_json_request, default_error_encoder, encode_json_request, encode_json_response,
    nop_request_decoder, DecodeRequestFn, DecodeResponseFn, EncodeRequestFn, EncodeResponseFn,
    ErrorEncoderFn, FinalizerFn, WriterHook,
};
pub use consumer::Consumer;
pub use in_memory::InMemoryBroker;
pub use message::BrokerMessage;
pub use producer::{Producer, DEFAULT_WRITE_TIMEOUT};
pub use reader::BrokerReader;
pub use writer::BrokerWriter;
