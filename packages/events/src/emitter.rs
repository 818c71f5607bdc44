use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::EventError;

enum Handler<A> {
    Every(Box<dyn FnMut(&A) + Send>),
    Once(Box<dyn FnOnce(&A) + Send>),
}

/// Dispatches events of kind `K` carrying a payload of type `A`.
///
/// Handlers run synchronously, in registration order. A `once` handler
/// leaves an empty slot behind after it fires; the slot is skipped on later
/// emits and the order of the remaining handlers is unchanged.
pub struct EventEmitter<K, A = ()> {
    handlers: HashMap<K, Vec<Option<Handler<A>>>>,
    /// Bumped by `reset`; dispatches taken before it are not restored.
    generation: u64,
}

/// The handlers of one event kind, taken out of an [`EventEmitter`] so they
/// can run while the emitter itself is free to accept registrations.
///
/// Obtained from [`EventEmitter::take_for_emit`] and handed back with
/// [`EventEmitter::restore`].
pub struct Dispatch<K, A = ()> {
    kind: K,
    slots: Vec<Option<Handler<A>>>,
    generation: u64,
}

impl<K, A> Dispatch<K, A> {
    /// Invoke the taken handlers with `args`. Returns how many ran.
    pub fn run(&mut self, args: &A) -> usize {
        let mut invoked = 0;
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(Handler::Once(_))) {
                if let Some(Handler::Once(handler)) = slot.take() {
                    handler(args);
                    invoked += 1;
                }
            } else if let Some(Handler::Every(handler)) = slot {
                handler(args);
                invoked += 1;
            }
        }
        invoked
    }
}

impl<K, A> EventEmitter<K, A>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    /// Create an emitter recognizing exactly `kinds`.
    pub fn new(kinds: impl IntoIterator<Item = K>) -> Self {
        Self {
            handlers: kinds.into_iter().map(|kind| (kind, Vec::new())).collect(),
            generation: 0,
        }
    }

    pub fn recognizes(&self, kind: K) -> bool {
        self.handlers.contains_key(&kind)
    }

    fn slots(&mut self, kind: K) -> Result<&mut Vec<Option<Handler<A>>>, EventError> {
        self.handlers
            .get_mut(&kind)
            .ok_or_else(|| EventError::UnknownEvent(format!("{:?}", kind)))
    }

    /// Register `handler` for every future `kind` event.
    pub fn on(
        &mut self,
        kind: K,
        handler: impl FnMut(&A) + Send + 'static,
    ) -> Result<(), EventError> {
        self.slots(kind)?
            .push(Some(Handler::Every(Box::new(handler))));
        Ok(())
    }

    /// Register `handler` for the next `kind` event only.
    pub fn once(
        &mut self,
        kind: K,
        handler: impl FnOnce(&A) + Send + 'static,
    ) -> Result<(), EventError> {
        self.slots(kind)?
            .push(Some(Handler::Once(Box::new(handler))));
        Ok(())
    }

    /// Invoke every handler registered for `kind` with `args`.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&mut self, kind: K, args: &A) -> Result<usize, EventError> {
        let mut dispatch = self.take_for_emit(kind)?;
        let invoked = dispatch.run(args);
        self.restore(dispatch);
        Ok(invoked)
    }

    /// Take the handlers for `kind` out of the emitter.
    ///
    /// Handlers registered before the dispatch is restored are kept, but do
    /// not run as part of it.
    pub fn take_for_emit(&mut self, kind: K) -> Result<Dispatch<K, A>, EventError> {
        let slots = std::mem::take(self.slots(kind)?);
        Ok(Dispatch {
            kind,
            slots,
            generation: self.generation,
        })
    }

    /// Put back the handlers of a finished dispatch ahead of any registered
    /// meanwhile. Fired `once` handlers are gone. A dispatch taken before a
    /// [`reset`](Self::reset) is dropped.
    pub fn restore(&mut self, dispatch: Dispatch<K, A>) {
        if dispatch.generation != self.generation {
            return;
        }
        if let Some(slots) = self.handlers.get_mut(&dispatch.kind) {
            let added = std::mem::take(slots);
            slots.extend(dispatch.slots.into_iter().filter(Option::is_some));
            slots.extend(added);
        }
    }

    /// Number of live handlers for `kind`. Unrecognized kinds have none.
    pub fn handler_count(&self, kind: K) -> usize {
        self.handlers
            .get(&kind)
            .map(|slots| slots.iter().filter(|slot| slot.is_some()).count())
            .unwrap_or(0)
    }

    /// Drop all handlers. The recognized kinds stay the same.
    pub fn reset(&mut self) {
        for slots in self.handlers.values_mut() {
            slots.clear();
        }
        self.generation += 1;
    }
}

impl<K: fmt::Debug, A> fmt::Debug for EventEmitter<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(kind, slots)| (kind, slots.len())))
            .finish()
    }
}
