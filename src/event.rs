//! Notifications emitted by the scroll proxy, and the callbacks receiving them.
//!
//! The proxy never exposes native platform events. Each native scroll event is
//! turned into a [`ScrollEvent`], which is then handed to every registered
//! [`Listener`].

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Name of the notification emitted when the frame scrolls.
pub const SCROLL: &str = "scroll";

/// Payload of a `"scroll"` notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    /// Scroll offset of the frame, in pixels, read when the notification was
    /// emitted.
    pub data: f64,
}

impl ScrollEvent {
    /// Creates a new `ScrollEvent` for the given offset.
    pub fn new(data: f64) -> Self {
        ScrollEvent { data }
    }
}

/// Listener is a function that can be triggered by a notification.
///
/// It is cheap to clone: clones share the same function, and are considered
/// the same listener when unsubscribing.
pub struct Listener<E>(Rc<dyn Fn(&E)>);

impl<E> Listener<E> {
    /// Wraps the given function into a `Listener` object.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: 'static + Fn(&E),
    {
        Listener(Rc::new(f))
    }

    /// Returns a dummy listener that doesn't run anything.
    pub fn dummy() -> Self {
        Listener::from_fn(|_| ())
    }

    /// Returns `true` if both handles point to the same function.
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Listener(Rc::clone(&self.0))
    }
}

impl<E> Deref for Listener<E> {
    type Target = dyn Fn(&E) + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<E> From<Rc<dyn Fn(&E)>> for Listener<E> {
    fn from(f: Rc<dyn Fn(&E)>) -> Self {
        Listener(f)
    }
}

impl<E> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}
