//! Define the visual host trait for actual platform interaction.
//!
//! The scroll proxy doesn't create or draw anything by itself: it delegates
//! this job to a host, which owns the actual elements (DOM nodes, native
//! widgets, or plain structs in memory).
//!
//! This module defines the [`VisualHost`] trait, as well as a few
//! implementations. The [`puppet`] host is always available and is what the
//! tests use. The [`web`](crate::host::web) host needs the `web-backend` feature.

use std::fmt;
use std::rc::Rc;

pub mod puppet;
#[cfg(feature = "web-backend")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "web-backend")))]
pub mod web;

/// Identifies an element owned by a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a native listener registered with [`VisualHost::add_scroll_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeListenerId(pub usize);

/// Function run by the host when an element scrolls natively.
pub type NativeListener = Rc<dyn Fn()>;

/// Style properties the scroll proxy writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// CSS `width`.
    Width,
    /// CSS `height`.
    Height,
}

impl StyleProperty {
    /// Returns the CSS name of this property.
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
        }
    }
}

/// Trait defining the required methods to be a visual host.
///
/// A host is the interface between the scroll proxy and the platform
/// rendering it, like a browser document.
///
/// Every method takes `&self`: the host is shared between the proxy and the
/// native listeners it runs, so implementations use interior mutability.
/// Methods never fail. Invalid element ids are a caller bug, and hosts may
/// ignore them.
///
/// A host must not hold any internal borrow while running a
/// [`NativeListener`]: listeners are allowed to call back into the host.
pub trait VisualHost {
    /// Creates a new, detached element with the given tag name.
    fn create_element(&self, tag: &str) -> ElementId;

    /// Sets the class name of `element`.
    fn set_class_name(&self, element: ElementId, class_name: &str);

    /// Appends `child` as the last child of `parent`.
    fn append_child(&self, parent: ElementId, child: ElementId);

    /// Removes `child` from `parent`.
    ///
    /// Does nothing if `child` is not a child of `parent`.
    fn remove_child(&self, parent: ElementId, child: ElementId);

    /// Sets a style property of `element`, as a CSS string like `"20px"`.
    fn set_style(&self, element: ElementId, property: StyleProperty, value: &str);

    /// Returns the current vertical scroll offset of `element`.
    fn scroll_top(&self, element: ElementId) -> f64;

    /// Asks the platform to scroll `element` to `offset`.
    ///
    /// The platform may clamp or round the value.
    fn set_scroll_top(&self, element: ElementId, offset: f64);

    /// Measures the width of native scrollbars in the document owning `element`.
    ///
    /// Returns 0 on platforms where scrollbars overlay the content.
    fn scrollbar_width(&self, element: ElementId) -> f64;

    /// Runs `listener` each time `element` scrolls natively.
    fn add_scroll_listener(
        &self,
        element: ElementId,
        listener: NativeListener,
    ) -> NativeListenerId;

    /// Removes a listener registered with `add_scroll_listener`.
    fn remove_scroll_listener(&self, element: ElementId, id: NativeListenerId);

    /// Forgets `element`, so the platform can free it.
    ///
    /// Detaches it from its parent and drops its scroll listeners. The id is
    /// never reused; later operations on it are ignored.
    fn release_element(&self, element: ElementId);

    /// Returns a name to identify the host.
    ///
    /// Mostly used for debugging.
    fn name(&self) -> &str {
        "unknown"
    }
}
