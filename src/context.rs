//! Execution context threaded through every transport stage.
//!
//! Carries request-scoped values, an optional deadline, and a chain of
//! cancellation flags. Contexts are derived, never mutated in place: each
//! `with_*` call returns a new context, so a hook can only affect the
//! stages that run after it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

/// The context passed to every hook, codec, and endpoint invocation.
///
/// ## Example
///
/// ```
/// use transport_rust::Context;
///
/// let ctx = Context::background().with_value("tenant", "acme");
/// assert_eq!(ctx.value("tenant").and_then(|v| v.as_str()), Some("acme"));
///
/// let (ctx, canceller) = ctx.cancellable();
/// assert!(!ctx.is_cancelled());
/// canceller.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    /// Request-scoped values (correlation IDs, trace metadata, etc.).
    values: HashMap<String, Value>,
    /// Absolute deadline, if any. The sooner deadline always wins.
    deadline: Option<Instant>,
    /// Cancellation flags inherited from every ancestor plus our own.
    cancel_flags: Vec<Arc<AtomicBool>>,
}

impl Context {
    /// Create a root context with no values, no deadline, and no
    /// cancellation flag.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying an additional request-scoped value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a request-scoped value.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Derive a context whose deadline is the sooner of the existing
    /// deadline and `now + timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let mut derived = self.clone();
        derived.deadline = Some(match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        });
        derived
    }

    /// Derive a context with a fresh cancellation flag.
    ///
    /// The returned [`Canceller`] cancels the derived context (and any
    /// context derived from it) without affecting ancestors. It also
    /// cancels on drop, so cleanup is deterministic on every exit path.
    pub fn cancellable(&self) -> (Self, Canceller) {
        let flag = Arc::new(AtomicBool::new(false));
        let mut derived = self.clone();
        derived.cancel_flags.push(Arc::clone(&flag));
        (derived, Canceller { flag })
    }

    /// True when any flag in the cancellation chain is set or the
    /// deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if self
            .cancel_flags
            .iter()
            .any(|flag| flag.load(Ordering::SeqCst))
        {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    /// The absolute deadline, if one has been set.
    ///
    /// Blocking backends should use this to bound their waits.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Handle that cancels the context it was derived with.
///
/// Cancels on drop as well, so holding it for the duration of a dispatch
/// guarantees the per-dispatch context is released.
pub struct Canceller {
    flag: Arc<AtomicBool>,
}

impl Canceller {
    /// Cancel the associated context.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Drop for Canceller {
    fn drop(&mut self) {
        self.cancel();
    }
}
