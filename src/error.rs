//! Transport error taxonomy.

use std::error::Error;
use std::fmt;

use crate::BoxError;

/// Error type for transport operations.
#[derive(Debug)]
pub enum TransportError {
    /// Serializing a request or response into an envelope failed.
    Encode(String),
    /// Deserializing an inbound envelope into a domain request failed.
    Decode(String),
    /// Connection to the backend failed.
    Connection(String),
    /// The backend rejected the message.
    Rejected(String),
    /// The call's deadline passed before the backend responded.
    Timeout,
    /// The call's context was cancelled.
    Cancelled,
    /// Other error.
    Other(BoxError),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Encode(msg) => write!(f, "encode failed: {}", msg),
            TransportError::Decode(msg) => write!(f, "decode failed: {}", msg),
            TransportError::Connection(msg) => write!(f, "connection failed: {}", msg),
            TransportError::Rejected(msg) => write!(f, "message rejected: {}", msg),
            TransportError::Timeout => write!(f, "operation timed out"),
            TransportError::Cancelled => write!(f, "context cancelled"),
            TransportError::Other(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransportError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
