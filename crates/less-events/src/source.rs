//! EventSource: emitter capability by composition.
//!
//! A type that owns an [`Emitter`] implements [`EventSource::emitter`] and
//! gets the full registration/emission API as provided methods, which it may
//! override to add its own behaviour. [`listeners_of`] and
//! [`listener_count_of`] read the registry directly and skip any such
//! overrides, so tooling can inspect a source without side effects.
//!
//! ```
//! use less_events::{Emitter, EventSource, Listener};
//!
//! struct Clock {
//!     events: Emitter,
//! }
//!
//! impl EventSource for Clock {
//!     fn emitter(&self) -> &Emitter {
//!         &self.events
//!     }
//! }
//!
//! let clock = Clock { events: Emitter::new() };
//! clock.on("tick", Listener::new(|_| {}));
//! assert_eq!(less_events::listener_count_of(&clock, "tick"), 1);
//! ```

use serde_json::Value;

use crate::{
    args::Arg,
    config::{self, MaxListeners},
    emitter::Emitter,
    error::Result,
    listener::Listener,
};

/// Anything that exposes an emitter's registration and emission API.
///
/// Chaining methods carry `where Self: Sized` so the trait stays usable as
/// `dyn EventSource`.
pub trait EventSource {
    /// The emitter backing this source.
    fn emitter(&self) -> &Emitter;

    fn on(&self, name: &str, listener: Listener) -> &Self
    where
        Self: Sized,
    {
        self.emitter().on(name, listener);
        self
    }

    fn add_listener(&self, name: &str, listener: Listener) -> &Self
    where
        Self: Sized,
    {
        self.on(name, listener)
    }

    /// Register a dynamic value, which must be callable.
    fn try_on(&self, name: &str, value: Arg) -> Result<&Self>
    where
        Self: Sized,
    {
        let listener = Listener::from_arg(name, value)?;
        Ok(self.on(name, listener))
    }

    fn once(&self, name: &str, listener: Listener) -> Listener {
        self.emitter().once(name, listener)
    }

    fn off(&self, name: &str, listener: Option<&Listener>) -> &Self
    where
        Self: Sized,
    {
        self.emitter().off(name, listener);
        self
    }

    fn remove_listener(&self, name: &str, listener: Option<&Listener>) -> &Self
    where
        Self: Sized,
    {
        self.off(name, listener)
    }

    fn remove_all_listeners(&self) -> &Self
    where
        Self: Sized,
    {
        self.emitter().remove_all_listeners();
        self
    }

    fn emit(&self, name: &str, args: &[Arg]) -> &Self
    where
        Self: Sized,
    {
        self.emitter().emit(name, args);
        self
    }

    fn emit_args<I>(&self, name: &str, args: I) -> &Self
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.emitter().emit_args(name, args);
        self
    }

    fn emit_async(
        &self,
        name: &str,
        args: &[Arg],
        callback: impl FnOnce(Option<Value>) + Send + 'static,
    ) -> &Self
    where
        Self: Sized,
    {
        self.emitter().emit_async(name, args, callback);
        self
    }

    fn emit_async_args(&self, name: &str, args: Vec<Arg>) -> Result<&Self>
    where
        Self: Sized,
    {
        self.emitter().emit_async_args(name, args)?;
        Ok(self)
    }

    fn listen_to<S: EventSource>(&self, source: &S, name: &str) -> Listener
    where
        Self: Sized,
    {
        self.emitter().listen_to(source, name)
    }

    fn listen_to_as<S: EventSource>(
        &self,
        source: &S,
        source_name: &str,
        local_name: &str,
    ) -> Listener
    where
        Self: Sized,
    {
        self.emitter().listen_to_as(source, source_name, local_name)
    }

    fn listeners(&self, name: &str) -> Vec<Listener> {
        self.emitter().listeners(name)
    }

    fn listener_count(&self, name: &str) -> usize {
        self.emitter().listener_count(name)
    }

    fn set_max_listeners(&self, value: i64) -> &Self
    where
        Self: Sized,
    {
        self.emitter().set_max_listeners(value);
        self
    }
}

impl EventSource for Emitter {
    fn emitter(&self) -> &Emitter {
        self
    }
}

// ============================================================================
// Class-level accessors
// ============================================================================

/// Listeners of `source` for `name`, read straight from its registry.
pub fn listeners_of<S: EventSource + ?Sized>(source: &S, name: &str) -> Vec<Listener> {
    source.emitter().registry().lock().snapshot(name)
}

/// Listener count of `source` for `name`, read straight from its registry.
pub fn listener_count_of<S: EventSource + ?Sized>(source: &S, name: &str) -> usize {
    source.emitter().registry().lock().count(name)
}

impl Emitter {
    /// Threshold captured by emitters constructed without an override.
    pub fn default_max_listeners() -> MaxListeners {
        config::shared_default()
    }

    /// Change the shared default. Only emitters constructed afterwards see
    /// the new value.
    pub fn set_default_max_listeners(value: i64) -> MaxListeners {
        config::set_shared_default(MaxListeners::from_i64(value))
    }

    pub fn set_default_max_listeners_value(value: &Value) -> Result<MaxListeners> {
        Ok(config::set_shared_default(MaxListeners::from_value(value)?))
    }
}
