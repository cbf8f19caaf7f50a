//! Listener: a callable registered against an event name.
//!
//! Callbacks are stored as `Arc<dyn Fn(&[Arg])>` so registry snapshots are
//! cheap. Every `Listener::new` allocates a fresh [`ListenerId`]; clones share
//! it, and equality is by id, so "the same listener" means "a clone of the
//! handle that was registered".

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    args::Arg,
    error::{EmitterError, Result},
};

/// Identity of a listener; shared by all clones of one [`Listener`].
pub type ListenerId = u64;

/// Closure type for listeners.
pub type ListenerFn = dyn Fn(&[Arg]) + Send + Sync;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A cloneable, identity-compared listener handle.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<ListenerFn>,
}

impl Listener {
    /// Wrap `callback` in a new listener with a fresh identity.
    pub fn new(callback: impl Fn(&[Arg]) + Send + Sync + 'static) -> Self {
        Self::with_id(Self::allocate_id(), callback)
    }

    /// Reserve an id before the closure exists (for self-referencing adapters).
    pub(crate) fn allocate_id() -> ListenerId {
        NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn with_id(
        id: ListenerId,
        callback: impl Fn(&[Arg]) + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the listener. Panics propagate to the caller.
    pub fn call(&self, args: &[Arg]) {
        (self.callback)(args)
    }

    /// Convert a dynamic argument into a listener, failing when it is not
    /// callable. `event` only labels the error.
    pub fn from_arg(event: &str, arg: Arg) -> Result<Self> {
        match arg {
            Arg::Listener(l) => Ok(l),
            Arg::Next(next) => Ok(Self::new(move |args| {
                next.call(args.first().and_then(Arg::as_value).cloned());
            })),
            other => Err(EmitterError::InvalidListener {
                event: event.to_string(),
                received: other.kind().to_string(),
            }),
        }
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}
