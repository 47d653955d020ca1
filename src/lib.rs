mod context;
mod endpoint;
mod error;
mod error_handler;

pub mod broker;
pub mod hook;
pub mod notify;

pub use context::{Canceller, Context};
pub use endpoint::{BoxError, Endpoint};
pub use error::TransportError;
pub use error_handler::{ErrorHandler, LogErrorHandler, NopErrorHandler};
pub use hook::Hook;
