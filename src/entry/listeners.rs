//! Listener registry
//!
//! Publish/subscribe channel owned by an entry. Listeners are called in
//! registration order; a listener may (un)subscribe while an event is delivered.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by `subscribe`, needed to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

pub struct Listeners<E> {
    next_id: Cell<u64>,
    slots: RefCell<Vec<(ListenerId, Callback<E>)>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            slots: RefCell::new(Vec::new()),
        }
    }
}

impl<E> Listeners<E> {
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns false when `id` was not (or no longer) registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        slots.len() != before
    }

    pub fn emit(&self, event: &E) {
        // Snapshot first: listeners may re-enter subscribe/unsubscribe.
        let callbacks: Vec<Callback<E>> = self.slots.borrow().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_subscribers_in_order() {
        let listeners = Listeners::<u32>::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        listeners.subscribe(move |e| first.borrow_mut().push(("a", *e)));
        let second = seen.clone();
        listeners.subscribe(move |e| second.borrow_mut().push(("b", *e)));

        listeners.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners = Listeners::<()>::default();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = listeners.subscribe(move |_| counter.set(counter.get() + 1));

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(&());
        assert_eq!(hits.get(), 0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let listeners = Rc::new(Listeners::<()>::default());
        let own_id = Rc::new(Cell::new(None));

        let registry = Rc::downgrade(&listeners);
        let slot = own_id.clone();
        let id = listeners.subscribe(move |_| {
            if let (Some(registry), Some(id)) = (registry.upgrade(), slot.get()) {
                registry.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        listeners.emit(&());
        assert_eq!(listeners.len(), 0);
    }
}
