//! Ordered hook lists for cross-cutting concerns.
//!
//! A hook is a pure function from (context, envelope) to a possibly-derived
//! context. Hooks never replace the envelope and never fail; they exist to
//! observe the envelope and annotate the context (tracing, metadata
//! extraction) without changing the endpoint signature.

use std::sync::Arc;

use crate::Context;

/// A registered hook over an envelope of type `T`.
pub type Hook<T> = Arc<dyn Fn(Context, &T) -> Context + Send + Sync>;

/// Fold a hook list over the context in registration order.
///
/// Values set by hook `i` are visible to hook `i + 1` and to whatever stage
/// runs next. The chain only moves forward: a hook cannot affect a hook
/// that already ran.
pub fn apply<T: ?Sized>(
    hooks: &[Arc<dyn Fn(Context, &T) -> Context + Send + Sync>],
    ctx: Context,
    target: &T,
) -> Context {
    hooks.iter().fold(ctx, |ctx, hook| hook(ctx, target))
}
