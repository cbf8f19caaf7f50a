//! Per-emitter storage: event name -> ordered listeners.
//!
//! Plain data with no locking or notification logic; [`Emitter`](crate::Emitter)
//! wraps it in a mutex and drives removal one entry at a time so it can notify
//! `"removeListener"` listeners between steps without holding the lock.

use indexmap::IndexMap;

use crate::{
    emitter::EventName,
    listener::{Listener, ListenerId},
};

#[derive(Default)]
pub(crate) struct Registry {
    events: IndexMap<EventName, Vec<Listener>>,
}

impl Registry {
    /// Append `listener` under `name` and return the new sequence length.
    pub(crate) fn append(&mut self, name: &str, listener: Listener) -> usize {
        let list = self.events.entry(EventName::from(name)).or_default();
        list.push(listener);
        list.len()
    }

    /// Copy of the sequence for `name`; never aliases the live registry.
    pub(crate) fn snapshot(&self, name: &str) -> Vec<Listener> {
        self.events.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.events.get(name).map_or(0, Vec::len)
    }

    pub(crate) fn names(&self) -> Vec<EventName> {
        self.events.keys().cloned().collect()
    }

    pub(crate) fn entry_at(&self, name: &str, index: usize) -> Option<&Listener> {
        self.events.get(name).and_then(|list| list.get(index))
    }

    /// Remove one occurrence of `id` at or below `index`, preferring `index`
    /// itself. Listeners may have shifted the sequence while a notification
    /// ran, so this falls back to scanning toward the head.
    pub(crate) fn remove_at_or_below(&mut self, name: &str, index: usize, id: ListenerId) {
        let Some(list) = self.events.get_mut(name) else {
            return;
        };
        if list.is_empty() {
            return;
        }
        let start = index.min(list.len() - 1);
        if let Some(pos) = (0..=start).rev().find(|&i| list[i].id() == id) {
            list.remove(pos);
        }
    }

    /// Drop `name` if its sequence is empty.
    pub(crate) fn prune(&mut self, name: &str) {
        if self.events.get(name).is_some_and(Vec::is_empty) {
            self.events.shift_remove(name);
        }
    }

    pub(crate) fn remove_name(&mut self, name: &str) {
        self.events.shift_remove(name);
    }
}
