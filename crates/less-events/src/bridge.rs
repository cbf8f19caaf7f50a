//! Forwarding bridge: relay another source's events into an emitter.
//!
//! The handler installed on the source holds only a [`WeakEmitter`] of the
//! receiving side, so a source never keeps the receiver alive and two
//! emitters bridged in both directions do not leak. Once the receiver is
//! dropped the handler does nothing.
//!
//! The handler is installed through the source's [`EventSource::on`], so a
//! source that overrides registration sees bridge handlers too.

use std::sync::{Arc, Weak};

use crate::{
    emitter::{Emitter, EventName},
    error::{EmitterError, Result},
    listener::Listener,
    source::EventSource,
};

impl Emitter {
    /// Re-emit every `name` event of `source` on this emitter under the same
    /// name. Returns the handler so it can be removed from `source` later.
    pub fn listen_to<S: EventSource>(&self, source: &S, name: &str) -> Listener {
        self.listen_to_as(source, name, name)
    }

    /// Like [`listen_to`](Self::listen_to), but re-emits under `local_name`.
    pub fn listen_to_as<S: EventSource>(
        &self,
        source: &S,
        source_name: &str,
        local_name: &str,
    ) -> Listener {
        let receiver = self.downgrade();
        let local_name: EventName = Arc::from(local_name);

        let handler = Listener::new(move |args| {
            if let Some(receiver) = receiver.upgrade() {
                receiver.emit(&local_name, args);
            }
        });

        EventSource::on(source, source_name, handler.clone());
        handler
    }

    /// Bridge from a source that may already be gone.
    pub fn listen_to_weak<S: EventSource>(&self, source: &Weak<S>, name: &str) -> Result<Listener> {
        let source = source.upgrade().ok_or_else(|| EmitterError::InvalidSource {
            event: name.to_string(),
        })?;
        Ok(self.listen_to(&*source, name))
    }
}
