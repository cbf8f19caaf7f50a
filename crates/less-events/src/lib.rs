//! Named-event emitter with synchronous and sequential async dispatch.
//!
//! # Overview
//!
//! [`Emitter`] keeps an ordered registry of listeners per event name and
//! dispatches to them either all at once ([`Emitter::emit`]) or one at a time
//! through a continuation ([`Emitter::emit_async`]). Types that want the same
//! API embed an `Emitter` and implement [`EventSource`].
//!
//! # Modules
//!
//! - [`args`]: [`Arg`] dynamic argument values.
//! - [`listener`]: [`Listener`] handles compared by identity.
//! - [`config`]: [`MaxListeners`], [`EmitterOptions`] and the shared default.
//! - [`emitter`]: [`Emitter`] registration, removal and synchronous emission.
//! - [`pipeline`]: sequential async emission and the [`Next`] continuation.
//! - [`bridge`]: forwarding events from another source.
//! - [`source`]: [`EventSource`] capability trait and class-level accessors.

pub mod args;
pub mod bridge;
pub mod config;
pub mod emitter;
pub mod error;
pub mod listener;
pub mod pipeline;
pub mod source;

mod registry;

pub use args::{is_truthy, Arg};
pub use config::{EmitterOptions, MaxListeners, DEFAULT_MAX_LISTENERS};
pub use emitter::{Emitter, EventName, WeakEmitter, REMOVE_LISTENER};
pub use error::{EmitterError, Result};
pub use listener::{Listener, ListenerId};
pub use pipeline::Next;
pub use source::{listener_count_of, listeners_of, EventSource};

/// Builds an argument array from heterogeneous values.
///
/// ```
/// use less_events::{args, Arg};
///
/// let a = args![1, "two", true];
/// assert_eq!(a.len(), 3);
/// assert_eq!(a[1], Arg::from("two"));
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::Arg::from($arg)),*]
    };
}
