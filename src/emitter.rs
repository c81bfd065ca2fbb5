//! Publish/subscribe plumbing.
//!
//! [`EventEmitter`] is a small registry of listeners, keyed by event name.
//! Widgets emitting notifications own one and forward the [`Subscribable`]
//! methods to it.

use crate::event::Listener;

use ahash::AHashMap;
use std::cell::RefCell;

/// Something listeners can subscribe to.
pub trait Subscribable {
    /// Payload handed to listeners.
    type Payload;

    /// Registers `listener` for notifications named `event_name`.
    ///
    /// Listeners are invoked in registration order. Registering the same
    /// listener twice makes it run twice per notification.
    fn subscribe(&self, event_name: &str, listener: Listener<Self::Payload>);

    /// Removes `listener` from the notifications named `event_name`.
    ///
    /// Does nothing if it was never registered.
    fn unsubscribe(&self, event_name: &str, listener: &Listener<Self::Payload>);
}

/// Registry of listeners, keyed by event name.
///
/// Uses interior mutability so listeners can subscribe, unsubscribe or emit
/// while a notification is being dispatched.
pub struct EventEmitter<E> {
    listeners: RefCell<AHashMap<String, Vec<Listener<E>>>>,
}

new_default!(EventEmitter<E>);

impl<E> EventEmitter<E> {
    /// Creates a new, empty `EventEmitter`.
    pub fn new() -> Self {
        EventEmitter {
            listeners: RefCell::new(AHashMap::new()),
        }
    }

    /// Sends `payload` to every listener registered for `event_name`.
    ///
    /// The listener list is copied before running anything: changes made by a
    /// listener apply to the next notification.
    pub fn emit(&self, event_name: &str, payload: &E) {
        let listeners = match self.listeners.borrow().get(event_name) {
            Some(listeners) => listeners.clone(),
            None => return,
        };

        for listener in &listeners {
            listener(payload);
        }
    }

    /// Returns the number of listeners registered for `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .borrow()
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Removes every listener for every event.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E> Subscribable for EventEmitter<E> {
    type Payload = E;

    fn subscribe(&self, event_name: &str, listener: Listener<E>) {
        self.listeners
            .borrow_mut()
            .entry(event_name.to_string())
            .or_insert_with(Vec::new)
            .push(listener);
    }

    fn unsubscribe(&self, event_name: &str, listener: &Listener<E>) {
        let mut listeners = self.listeners.borrow_mut();
        let empty = match listeners.get_mut(event_name) {
            Some(list) => {
                if let Some(i) = list.iter().position(|l| l.same_as(listener))
                {
                    list.remove(i);
                }
                list.is_empty()
            }
            None => return,
        };

        if empty {
            listeners.remove(event_name);
        }
    }
}
