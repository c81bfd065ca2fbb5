//! Host using the browser DOM, through `web-sys`.
//!
//! Elements are regular `HtmlElement`s. Pages hand their own container to the
//! host with [`WebHost::register`] to get an [`ElementId`] for it.
#![cfg(feature = "web-backend")]

use crate::host::{
    ElementId, NativeListener, NativeListenerId, StyleProperty, VisualHost,
};

use ahash::AHashMap;
use std::cell::{Cell, RefCell};
use std::io;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Id given out when the document refuses to create an element.
///
/// Every operation on it is ignored.
pub const DETACHED: ElementId = ElementId(usize::MAX);

fn io_error(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message)
}

/// Host using the browser DOM.
pub struct WebHost {
    document: Document,
    // Released elements leave a `None` so ids stay stable.
    elements: RefCell<Vec<Option<HtmlElement>>>,
    listeners: RefCell<
        AHashMap<NativeListenerId, (ElementId, Closure<dyn FnMut(web_sys::Event)>)>,
    >,
    next_listener: Cell<usize>,
}

impl WebHost {
    /// Creates a new host for the document of the current window.
    pub fn init() -> io::Result<Self> {
        let document = web_sys::window()
            .ok_or_else(|| io_error("Failed to get window"))?
            .document()
            .ok_or_else(|| io_error("Failed to get document"))?;

        Ok(Self::with_document(document))
    }

    /// Creates a new host creating elements in `document`.
    pub fn with_document(document: Document) -> Self {
        WebHost {
            document,
            elements: RefCell::new(Vec::new()),
            listeners: RefCell::new(AHashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    /// Makes an existing element known to the host, usually the container
    /// the scroll proxy goes into.
    pub fn register(&self, element: HtmlElement) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        elements.push(Some(element));
        ElementId(elements.len() - 1)
    }

    /// Returns the DOM element behind `id`.
    pub fn element(&self, id: ElementId) -> Option<HtmlElement> {
        let element = self.elements.borrow().get(id.0).cloned().flatten();
        if element.is_none() {
            log::warn!("Web host: unknown element {}", id);
        }
        element
    }

    fn create(&self, tag: &str) -> Option<HtmlElement> {
        self.document
            .create_element(tag)
            .ok()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn set_css(element: &HtmlElement, property: &str, value: &str) {
        if element.style().set_property(property, value).is_err() {
            log::warn!("Web host: cannot set {} to {}", property, value);
        }
    }

    /// Measures native scrollbars by comparing the width available to a
    /// child with and without them, in a hidden test region.
    fn measure_scrollbar(&self, document: &Document) -> Option<f64> {
        let root = document.document_element()?;
        let outer = self.create("div")?;
        let inner = self.create("div")?;

        for (property, value) in &[
            ("width", "100%"),
            ("min-width", "0px"),
            ("height", "200px"),
            ("display", "block"),
        ] {
            Self::set_css(&inner, property, value);
        }
        for (property, value) in &[
            ("position", "absolute"),
            ("top", "0px"),
            ("left", "-10000px"),
            ("visibility", "hidden"),
            ("width", "200px"),
            ("min-width", "0px"),
            ("height", "150px"),
            ("overflow", "hidden"),
            ("display", "block"),
        ] {
            Self::set_css(&outer, property, value);
        }

        outer.append_child(&inner).ok()?;
        root.append_child(&outer).ok()?;

        let without = inner.offset_width();
        Self::set_css(&outer, "overflow", "scroll");
        let mut with = inner.offset_width();
        if without == with {
            with = outer.client_width();
        }

        if root.remove_child(&outer).is_err() {
            log::warn!("Web host: cannot remove the scrollbar probe");
        }

        Some(f64::from(without - with))
    }
}

impl VisualHost for WebHost {
    fn create_element(&self, tag: &str) -> ElementId {
        match self.create(tag) {
            Some(element) => self.register(element),
            None => {
                log::warn!("Web host: cannot create <{}>", tag);
                DETACHED
            }
        }
    }

    fn set_class_name(&self, element: ElementId, class_name: &str) {
        if let Some(element) = self.element(element) {
            element.set_class_name(class_name);
        }
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            if parent.append_child(&child).is_err() {
                log::warn!("Web host: cannot append child");
            }
        }
    }

    fn remove_child(&self, parent: ElementId, child: ElementId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            // Fails when `child` is not attached anymore, which is fine.
            let _ = parent.remove_child(&child);
        }
    }

    fn set_style(&self, element: ElementId, property: StyleProperty, value: &str) {
        if let Some(element) = self.element(element) {
            Self::set_css(&element, property.css_name(), value);
        }
    }

    fn scroll_top(&self, element: ElementId) -> f64 {
        self.element(element)
            .map_or(0.0, |element| f64::from(element.scroll_top()))
    }

    fn set_scroll_top(&self, element: ElementId, offset: f64) {
        if let Some(element) = self.element(element) {
            element.set_scroll_top(offset.round() as i32);
        }
    }

    fn scrollbar_width(&self, element: ElementId) -> f64 {
        let document = self
            .element(element)
            .and_then(|element| element.owner_document())
            .unwrap_or_else(|| self.document.clone());

        self.measure_scrollbar(&document).unwrap_or_else(|| {
            log::warn!("Web host: cannot measure scrollbars, assuming overlays");
            0.0
        })
    }

    fn add_scroll_listener(
        &self,
        element: ElementId,
        listener: NativeListener,
    ) -> NativeListenerId {
        let id = NativeListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);

        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            listener();
        }) as Box<dyn FnMut(_)>);

        if let Some(target) = self.element(element) {
            if target
                .add_event_listener_with_callback(
                    "scroll",
                    closure.as_ref().unchecked_ref(),
                )
                .is_err()
            {
                log::warn!("Web host: cannot listen to scroll events on {}", element);
            }
        }

        self.listeners.borrow_mut().insert(id, (element, closure));
        id
    }

    fn remove_scroll_listener(&self, element: ElementId, id: NativeListenerId) {
        let removed = self.listeners.borrow_mut().remove(&id);
        if let Some((registered, closure)) = removed {
            if registered != element {
                log::warn!(
                    "Web host: listener registered on {}, not {}",
                    registered,
                    element
                );
            }
            if let Some(target) = self.element(registered) {
                let _ = target.remove_event_listener_with_callback(
                    "scroll",
                    closure.as_ref().unchecked_ref(),
                );
            }
        }
    }

    fn release_element(&self, element: ElementId) {
        let released = match self.elements.borrow_mut().get_mut(element.0) {
            Some(slot) => slot.take(),
            None => None,
        };
        let released = match released {
            Some(released) => released,
            None => return,
        };

        let ids: Vec<NativeListenerId> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, (registered, _))| *registered == element)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            let removed = self.listeners.borrow_mut().remove(&id);
            if let Some((_, closure)) = removed {
                let _ = released.remove_event_listener_with_callback(
                    "scroll",
                    closure.as_ref().unchecked_ref(),
                );
            }
        }

        released.remove();
    }

    fn name(&self) -> &str {
        "web"
    }
}
