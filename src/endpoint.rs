//! The generic endpoint contract adapted by every transport.

use crate::Context;

/// Boxed error type returned by endpoints.
///
/// Application errors stay opaque to the transport layer; adapters route
/// them to error handlers and error encoders without inspecting them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The unit of application logic being adapted to a messaging transport.
///
/// Request and response types are bound per adapter instance, so each
/// adapter is statically typed to the handler shape it wraps.
pub trait Endpoint<Req, Resp>: Send + Sync {
    /// Invoke the endpoint with a context and a request.
    fn call(&self, ctx: &Context, request: Req) -> Result<Resp, BoxError>;
}

/// Any matching closure or function is an endpoint.
impl<F, Req, Resp> Endpoint<Req, Resp> for F
where
    F: Fn(&Context, Req) -> Result<Resp, BoxError> + Send + Sync,
{
    fn call(&self, ctx: &Context, request: Req) -> Result<Resp, BoxError> {
        self(ctx, request)
    }
}
