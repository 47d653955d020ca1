//! Diagnostic sinks for non-terminal transport errors.
//!
//! Error handlers observe errors; they cannot alter control flow. Adapters
//! are built with an explicit sink, defaulting to [`NopErrorHandler`]
//! constructed once at build time, never per call.

use std::error::Error;
use std::sync::{Arc, Mutex};

use crate::Context;

/// Trait for handling non-terminal transport errors.
///
/// This is a diagnostic measure. Finer-grained error handling, including
/// producing a reply-side payload, belongs in a consumer's error encoder,
/// which has access to the outbound writer.
pub trait ErrorHandler: Send + Sync {
    /// Observe an error. Side effects only.
    fn handle(&self, ctx: &Context, err: &(dyn Error + 'static));
}

/// Error handler that discards everything. The default for every adapter.
pub struct NopErrorHandler;

impl ErrorHandler for NopErrorHandler {
    fn handle(&self, _ctx: &Context, _err: &(dyn Error + 'static)) {}
}

/// Error handler that logs via `tracing` and optionally mirrors each
/// message into a shared buffer so tests can assert on diagnostics.
pub struct LogErrorHandler {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl LogErrorHandler {
    pub fn new() -> Self {
        LogErrorHandler { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogErrorHandler {
            buffer: Some(buffer),
        }
    }
}

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, _ctx: &Context, err: &(dyn Error + 'static)) {
        tracing::warn!(error = %err, "transport error");
        if let Some(buffer) = &self.buffer {
            if let Ok(mut buffer) = buffer.lock() {
                buffer.push(err.to_string());
            }
        }
    }
}
