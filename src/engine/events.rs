// Event subscription and synchronous dispatch
//
// Handlers are registered per event key and run during the event-processing
// phase of a tick. A handler never mutates game state directly: it returns an
// optional message that the caller routes to whoever owns that state.

use std::collections::HashMap;
use std::hash::Hash;

type Handler<E, O> = Box<dyn FnMut(&E) -> Option<O>>;

/// Maps an event key to the single handler subscribed to it
pub struct EventDispatcher<K, E, O> {
    handlers: HashMap<K, Handler<E, O>>,
}

impl<K, E, O> Default for EventDispatcher<K, E, O>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E, O> EventDispatcher<K, E, O>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Subscribe a handler to a key. An existing handler for the same key is
    /// replaced; returns true if that happened.
    pub fn accept<F>(&mut self, key: K, handler: F) -> bool
    where
        F: FnMut(&E) -> Option<O> + 'static,
    {
        self.handlers.insert(key, Box::new(handler)).is_some()
    }

    /// Run the handler subscribed to `key`, if any
    pub fn dispatch(&mut self, key: &K, event: &E) -> Option<O> {
        self.handlers.get_mut(key).and_then(|handler| handler(event))
    }

    /// Dispatch a batch of keyed events in order, collecting handler output
    pub fn dispatch_all<'a, I>(&mut self, events: I) -> Vec<O>
    where
        I: IntoIterator<Item = (K, &'a E)>,
        E: 'a,
    {
        events
            .into_iter()
            .filter_map(|(key, event)| self.dispatch(&key, event))
            .collect()
    }
}
