//! Emitter: named-event registry with synchronous dispatch.
//!
//! Listeners are grouped by event name and called in registration order.
//! Snapshot-on-emit semantics mean:
//!   - A listener removed *during* emission is still called in that round.
//!   - A listener added *during* emission is NOT called until the next emit.
//!
//! Every removal first emits a `"removeListener"` notification carrying
//! `(name, listener)`, before the entry is actually deleted. Listeners on
//! `"removeListener"` itself are notified of their own removal too.
//!
//! Panics inside a listener propagate to the caller; the rest of that round
//! is skipped.
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`).
//! The lock is never held while a listener runs, so listeners may call
//! `on()`/`off()`/`emit()` reentrantly without deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    args::Arg,
    config::{EmitterOptions, MaxListeners},
    error::Result,
    listener::{Listener, ListenerId},
    registry::Registry,
};

/// Key under which listeners are grouped.
pub type EventName = Arc<str>;

/// Event emitted once per removed listener, with `(name, listener)`.
pub const REMOVE_LISTENER: &str = "removeListener";

/// Cloneable handle to a listener registry.
///
/// Clones share the same registry; the registry is dropped with the last
/// handle.
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Mutex<Registry>,
    /// `MaxListeners` in the `-1 = unlimited` encoding.
    max_listeners: AtomicI64,
}

/// Non-owning handle, used by adapters and bridges so they never keep an
/// emitter alive.
#[derive(Clone, Debug)]
pub struct WeakEmitter {
    inner: Weak<Inner>,
}

impl WeakEmitter {
    pub fn upgrade(&self) -> Option<Emitter> {
        self.inner.upgrade().map(|inner| Emitter { inner })
    }
}

/// Which entries a removal sweep visits.
#[derive(Clone, Copy)]
enum Sweep {
    /// Every entry equal to the given listener, deleted one by one.
    Matching(ListenerId),
    /// Every entry, notified first and then cleared in one go.
    Clear,
    /// Every entry, deleted one by one right after its notification.
    EachEntry,
}

impl Sweep {
    fn visits(self, listener: &Listener) -> bool {
        match self {
            Self::Matching(id) => listener.id() == id,
            Self::Clear | Self::EachEntry => true,
        }
    }
}

impl Emitter {
    /// Create an empty emitter that captures the current shared default
    /// threshold.
    pub fn new() -> Self {
        Self::with_options(EmitterOptions::default())
    }

    pub fn with_options(options: EmitterOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::default()),
                max_listeners: AtomicI64::new(options.resolve_max_listeners().as_i64()),
            }),
        }
    }

    /// Shorthand for `with_options` with only a threshold override.
    pub fn with_max_listeners(value: i64) -> Self {
        Self::with_options(EmitterOptions::default().with_max_listeners(value))
    }

    pub fn downgrade(&self) -> WeakEmitter {
        WeakEmitter {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn registry(&self) -> &Mutex<Registry> {
        &self.inner.registry
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Append `listener` to the sequence for `name`.
    ///
    /// Logs a warning when the sequence grows past the threshold; the
    /// listener is registered regardless.
    pub fn on(&self, name: &str, listener: Listener) -> &Self {
        let count = self.inner.registry.lock().append(name, listener);
        let max = self.max_listeners();
        if max.is_exceeded_by(count) {
            tracing::warn!(
                event = name,
                count,
                max_listeners = max.as_i64(),
                "possible emitter memory leak detected: listener count exceeds max_listeners"
            );
        }
        self
    }

    /// Alias for [`on`](Self::on).
    pub fn add_listener(&self, name: &str, listener: Listener) -> &Self {
        self.on(name, listener)
    }

    /// Register a closure and return its handle for later removal.
    pub fn subscribe(
        &self,
        name: &str,
        callback: impl Fn(&[Arg]) + Send + Sync + 'static,
    ) -> Listener {
        let listener = Listener::new(callback);
        self.on(name, listener.clone());
        listener
    }

    /// Register a dynamic value, which must be callable.
    pub fn try_on(&self, name: &str, value: Arg) -> Result<&Self> {
        let listener = Listener::from_arg(name, value)?;
        Ok(self.on(name, listener))
    }

    /// Register `listener` so it fires at most once.
    ///
    /// The returned adapter removes itself before calling `listener`, so an
    /// emission triggered from inside `listener` cannot reach it again. Pass
    /// the adapter to [`off`](Self::off) to cancel it before it fires.
    pub fn once(&self, name: &str, listener: Listener) -> Listener {
        let id = Listener::allocate_id();
        let emitter = self.downgrade();
        let event: EventName = Arc::from(name);
        let fired = AtomicBool::new(false);

        let adapter = Listener::with_id(id, move |args| {
            // An outer round may still hold the adapter in its snapshot.
            if fired.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(emitter) = emitter.upgrade() {
                emitter.sweep(&event, Sweep::Matching(id));
            }
            listener.call(args);
        });

        self.on(name, adapter.clone());
        adapter
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    /// Remove every occurrence of `listener` under `name`, or every entry when
    /// `listener` is `None`.
    pub fn off(&self, name: &str, listener: Option<&Listener>) -> &Self {
        match listener {
            Some(listener) => self.sweep(name, Sweep::Matching(listener.id())),
            None => self.sweep(name, Sweep::Clear),
        }
        self
    }

    /// Alias for [`off`](Self::off).
    pub fn remove_listener(&self, name: &str, listener: Option<&Listener>) -> &Self {
        self.off(name, listener)
    }

    /// Remove every entry under `name`.
    pub fn off_all(&self, name: &str) -> &Self {
        self.off(name, None)
    }

    /// Remove every listener of every event.
    ///
    /// Event names are taken from a snapshot at call start, in registry
    /// order. Within a name, entries are notified and removed tail to head.
    pub fn remove_all_listeners(&self) -> &Self {
        let names = self.inner.registry.lock().names();
        for name in names {
            self.sweep(&name, Sweep::EachEntry);
        }
        self
    }

    /// Walks the sequence tail to head so index-based removal never skips an
    /// entry. The lock is released around each notification.
    fn sweep(&self, name: &str, mode: Sweep) {
        let mut cursor = self.inner.registry.lock().count(name);
        while cursor > 0 {
            cursor -= 1;
            let found = self
                .inner
                .registry
                .lock()
                .entry_at(name, cursor)
                .filter(|entry| mode.visits(entry))
                .cloned();
            let Some(entry) = found else {
                continue;
            };

            self.emit(REMOVE_LISTENER, &[Arg::from(name), Arg::Listener(entry.clone())]);

            if !matches!(mode, Sweep::Clear) {
                self.inner
                    .registry
                    .lock()
                    .remove_at_or_below(name, cursor, entry.id());
            }
        }

        let mut registry = self.inner.registry.lock();
        match mode {
            Sweep::Matching(_) => registry.prune(name),
            Sweep::Clear | Sweep::EachEntry => registry.remove_name(name),
        }
    }

    // ------------------------------------------------------------------------
    // Synchronous emission
    // ------------------------------------------------------------------------

    /// Call every listener registered for `name`, in order, with `args`.
    ///
    /// A snapshot of the sequence is taken before iteration so that additions
    /// or removals during a callback do not affect the current round.
    pub fn emit(&self, name: &str, args: &[Arg]) -> &Self {
        // Snapshot under the lock (cheap: Arc clones only).
        let snapshot = self.inner.registry.lock().snapshot(name);
        for listener in &snapshot {
            listener.call(args);
        }
        self
    }

    /// [`emit`](Self::emit) with any sequence of convertible arguments.
    pub fn emit_args<I>(&self, name: &str, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
        self.emit(name, &args)
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Copy of the listeners for `name`; safe to keep across mutations.
    pub fn listeners(&self, name: &str) -> Vec<Listener> {
        self.inner.registry.lock().snapshot(name)
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.inner.registry.lock().count(name)
    }

    /// Registered event names, in registry order.
    pub fn event_names(&self) -> Vec<EventName> {
        self.inner.registry.lock().names()
    }

    // ------------------------------------------------------------------------
    // Threshold
    // ------------------------------------------------------------------------

    pub fn max_listeners(&self) -> MaxListeners {
        MaxListeners::from_stored(self.inner.max_listeners.load(Ordering::Relaxed))
    }

    /// Set this emitter's threshold. Zero or negative means unlimited.
    pub fn set_max_listeners(&self, value: i64) -> &Self {
        self.store_max_listeners(MaxListeners::from_i64(value));
        self
    }

    /// Set the threshold from a dynamic value; fails unless it is numeric.
    pub fn set_max_listeners_value(&self, value: &Value) -> Result<&Self> {
        self.store_max_listeners(MaxListeners::from_value(value)?);
        Ok(self)
    }

    fn store_max_listeners(&self, max: MaxListeners) {
        self.inner.max_listeners.store(max.as_i64(), Ordering::Relaxed);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("events", &self.event_names())
            .field("max_listeners", &self.max_listeners())
            .finish()
    }
}
