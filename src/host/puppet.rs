//! Puppet host, simulating a browser document in memory.
//!
//! Mostly used for testing: it records every element, style and listener so
//! tests can observe what the scroll proxy did, and lets them play the part of
//! the user (dragging the scrollbar) or of the platform (delivering native
//! scroll events, clamping offsets, rounding them at zoom levels).
//!
//! Layout is deliberately naive: an element's client height is its `height`
//! style, and its content height is the sum of its children's `height` styles.

use crate::host::{
    ElementId, NativeListener, NativeListenerId, StyleProperty, VisualHost,
};
use crate::style;

use ahash::AHashMap;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Size (width, height) of the root container created with every puppet host.
pub const DEFAULT_ROOT_SIZE: (f64, f64) = (400.0, 400.0);

/// Scrollbar width reported by default, as on most desktop platforms.
pub const DEFAULT_SCROLLBAR_WIDTH: f64 = 17.0;

/// When native scroll events caused by the program are delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDelivery {
    /// Events are queued until [`PuppetHost::flush`], like a browser firing
    /// them on the next frame.
    Queued,
    /// Events are dispatched synchronously, inside the call that scrolled.
    Immediate,
}

#[derive(Debug, Clone)]
struct ObservedElement {
    tag: String,
    class_name: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    styles: AHashMap<StyleProperty, String>,
    scroll_top: f64,
}

impl ObservedElement {
    fn new(tag: &str) -> Self {
        ObservedElement {
            tag: tag.to_string(),
            class_name: String::new(),
            parent: None,
            children: Vec::new(),
            styles: AHashMap::new(),
            scroll_top: 0.0,
        }
    }

    fn px(&self, property: StyleProperty) -> f64 {
        self.styles
            .get(&property)
            .and_then(|value| style::parse_px(value))
            .unwrap_or(0.0)
    }
}

struct PuppetHostState {
    // Released elements leave a `None` so ids stay stable.
    elements: Vec<Option<ObservedElement>>,
    listeners: Vec<(ElementId, NativeListenerId, NativeListener)>,
    next_listener: usize,
    pending: VecDeque<ElementId>,
    scrollbar_width: f64,
    zoom: f64,
    delivery: ScrollDelivery,
}

impl PuppetHostState {
    fn element(&self, id: ElementId) -> Option<&ObservedElement> {
        self.elements.get(id.0).and_then(Option::as_ref)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut ObservedElement> {
        let element = self.elements.get_mut(id.0).and_then(Option::as_mut);
        if element.is_none() {
            log::warn!("Puppet host: unknown element {}", id);
        }
        element
    }

    fn content_height(&self, id: ElementId) -> f64 {
        self.element(id).map_or(0.0, |element| {
            element
                .children
                .iter()
                .filter_map(|&child| self.element(child))
                .map(|child| child.px(StyleProperty::Height))
                .sum()
        })
    }

    fn max_scroll_top(&self, id: ElementId) -> f64 {
        let client = self
            .element(id)
            .map_or(0.0, |element| element.px(StyleProperty::Height));
        (self.content_height(id) - client).max(0.0)
    }

    /// Moves the offset of `id` to what the platform would accept.
    ///
    /// Returns `true` if the offset changed.
    fn scroll_to(&mut self, id: ElementId, offset: f64) -> bool {
        let requested = if offset.is_nan() { 0.0 } else { offset };
        let rounded = (requested * self.zoom).round() / self.zoom;
        let max = self.max_scroll_top(id);
        let effective = rounded.max(0.0).min(max);

        if effective != requested {
            log::trace!(
                "Puppet host: {} asked to scroll to {}, got {} (max {})",
                id,
                requested,
                effective,
                max
            );
        }

        match self.element_mut(id) {
            Some(element) if element.scroll_top != effective => {
                element.scroll_top = effective;
                true
            }
            _ => false,
        }
    }

    /// Clamps the offset of `id` again after a layout change.
    fn reclamp(&mut self, id: ElementId) -> bool {
        let max = self.max_scroll_top(id);
        match self.element_mut(id) {
            Some(element) if element.scroll_top > max => {
                element.scroll_top = max;
                true
            }
            _ => false,
        }
    }

    fn listeners_of(&self, id: ElementId) -> Vec<NativeListener> {
        self.listeners
            .iter()
            .filter(|(element, _, _)| *element == id)
            .map(|(_, _, listener)| listener.clone())
            .collect()
    }
}

/// In-memory host recording everything the scroll proxy does.
pub struct PuppetHost {
    state: RefCell<PuppetHostState>,
    root: ElementId,
}

new_default!(PuppetHost);

impl PuppetHost {
    /// Creates a new puppet host with classic, 17px wide scrollbars.
    ///
    /// The host starts with a 400×400 root container, see [`PuppetHost::root`].
    pub fn new() -> Self {
        Self::with_scrollbar_width(DEFAULT_SCROLLBAR_WIDTH)
    }

    /// Creates a new puppet host reporting overlay scrollbars (0px wide).
    pub fn overlay() -> Self {
        Self::with_scrollbar_width(0.0)
    }

    /// Creates a new puppet host reporting the given scrollbar width.
    pub fn with_scrollbar_width(scrollbar_width: f64) -> Self {
        let mut root = ObservedElement::new("body");
        root.styles
            .insert(StyleProperty::Width, style::px(DEFAULT_ROOT_SIZE.0));
        root.styles
            .insert(StyleProperty::Height, style::px(DEFAULT_ROOT_SIZE.1));

        PuppetHost {
            state: RefCell::new(PuppetHostState {
                elements: vec![Some(root)],
                listeners: Vec::new(),
                next_listener: 0,
                pending: VecDeque::new(),
                scrollbar_width,
                zoom: 1.0,
                delivery: ScrollDelivery::Queued,
            }),
            root: ElementId(0),
        }
    }

    /// Returns the root container.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Sets the page zoom factor.
    ///
    /// Offsets are rounded to device pixels: at a zoom of `0.5`, asking for
    /// `101` scrolls to `102`.
    pub fn set_zoom(&self, zoom: f64) {
        if zoom > 0.0 {
            self.state.borrow_mut().zoom = zoom;
        }
    }

    /// Chooses when scroll events caused by the program are delivered.
    pub fn set_delivery(&self, delivery: ScrollDelivery) {
        self.state.borrow_mut().delivery = delivery;
    }

    /// Returns the style value of `element`, as it was written.
    pub fn style(&self, element: ElementId, property: StyleProperty) -> Option<String> {
        self.state
            .borrow()
            .element(element)
            .and_then(|e| e.styles.get(&property).cloned())
    }

    /// Returns the rendered height of `element`, in pixels.
    pub fn height(&self, element: ElementId) -> f64 {
        self.state
            .borrow()
            .element(element)
            .map_or(0.0, |e| e.px(StyleProperty::Height))
    }

    /// Returns the rendered width of `element`, in pixels.
    pub fn width(&self, element: ElementId) -> f64 {
        self.state
            .borrow()
            .element(element)
            .map_or(0.0, |e| e.px(StyleProperty::Width))
    }

    /// Returns the class name of `element`.
    pub fn class_name(&self, element: ElementId) -> String {
        self.state
            .borrow()
            .element(element)
            .map(|e| e.class_name.clone())
            .unwrap_or_default()
    }

    /// Returns the tag name of `element`.
    pub fn tag(&self, element: ElementId) -> String {
        self.state
            .borrow()
            .element(element)
            .map(|e| e.tag.clone())
            .unwrap_or_default()
    }

    /// Returns the children of `element`, in order.
    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.state
            .borrow()
            .element(element)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    /// Returns the parent of `element`, if it is attached.
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.state.borrow().element(element).and_then(|e| e.parent)
    }

    /// Returns `true` if `element` was created and not released yet.
    pub fn is_alive(&self, element: ElementId) -> bool {
        self.state.borrow().element(element).is_some()
    }

    /// Returns the largest offset `element` can scroll to.
    pub fn max_scroll_top(&self, element: ElementId) -> f64 {
        self.state.borrow().max_scroll_top(element)
    }

    /// Returns the number of native scroll listeners on `element`.
    pub fn scroll_listener_count(&self, element: ElementId) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|(e, _, _)| *e == element)
            .count()
    }

    /// Returns the number of scroll events waiting for [`PuppetHost::flush`].
    pub fn pending_events(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Simulates the user dragging the scrollbar of `element` to `offset`.
    ///
    /// The native scroll event is delivered immediately if the offset changed.
    pub fn user_scroll(&self, element: ElementId, offset: f64) {
        let changed = self.state.borrow_mut().scroll_to(element, offset);
        if changed {
            self.fire_scroll(element);
        }
    }

    /// Delivers one native scroll event on `element`, whatever its offset.
    pub fn fire_scroll(&self, element: ElementId) {
        // Release the state before running anything: listeners call back.
        let listeners = self.state.borrow().listeners_of(element);
        for listener in listeners {
            listener();
        }
    }

    /// Delivers every queued scroll event, including the ones queued while
    /// flushing.
    ///
    /// Returns the number of events delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.state.borrow_mut().pending.pop_front();
            match next {
                Some(element) => {
                    self.fire_scroll(element);
                    delivered += 1;
                }
                None => return delivered,
            }
        }
    }

    fn scrolled(&self, element: ElementId) {
        let delivery = self.state.borrow().delivery;
        match delivery {
            ScrollDelivery::Queued => {
                self.state.borrow_mut().pending.push_back(element)
            }
            ScrollDelivery::Immediate => self.fire_scroll(element),
        }
    }
}

impl VisualHost for PuppetHost {
    fn create_element(&self, tag: &str) -> ElementId {
        let mut state = self.state.borrow_mut();
        state.elements.push(Some(ObservedElement::new(tag)));
        ElementId(state.elements.len() - 1)
    }

    fn set_class_name(&self, element: ElementId, class_name: &str) {
        if let Some(e) = self.state.borrow_mut().element_mut(element) {
            e.class_name = class_name.to_string();
        }
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut state = self.state.borrow_mut();
        if state.element(parent).is_none() || state.element(child).is_none() {
            log::warn!("Puppet host: cannot append {} to {}", child, parent);
            return;
        }

        // Appending an attached element moves it.
        if let Some(previous) = state.element(child).and_then(|e| e.parent) {
            if let Some(p) = state.element_mut(previous) {
                p.children.retain(|&c| c != child);
            }
        }

        if let Some(p) = state.element_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = state.element_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn remove_child(&self, parent: ElementId, child: ElementId) {
        let mut state = self.state.borrow_mut();
        if state.element(child).and_then(|e| e.parent) != Some(parent) {
            return;
        }

        if let Some(p) = state.element_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = state.element_mut(child) {
            c.parent = None;
        }
    }

    fn set_style(&self, element: ElementId, property: StyleProperty, value: &str) {
        let clamped = {
            let mut state = self.state.borrow_mut();
            let parent = match state.element_mut(element) {
                Some(e) => {
                    e.styles.insert(property, value.to_string());
                    e.parent
                }
                None => return,
            };

            if property != StyleProperty::Height {
                return;
            }

            // A height change shrinks the range of the element itself, and
            // of its parent.
            let mut clamped = Vec::new();
            for id in std::iter::once(element).chain(parent) {
                if state.reclamp(id) {
                    clamped.push(id);
                }
            }
            clamped
        };

        for id in clamped {
            self.scrolled(id);
        }
    }

    fn scroll_top(&self, element: ElementId) -> f64 {
        self.state
            .borrow()
            .element(element)
            .map_or(0.0, |e| e.scroll_top)
    }

    fn set_scroll_top(&self, element: ElementId, offset: f64) {
        let changed = self.state.borrow_mut().scroll_to(element, offset);
        if changed {
            self.scrolled(element);
        }
    }

    fn scrollbar_width(&self, _element: ElementId) -> f64 {
        self.state.borrow().scrollbar_width
    }

    fn add_scroll_listener(
        &self,
        element: ElementId,
        listener: NativeListener,
    ) -> NativeListenerId {
        let mut state = self.state.borrow_mut();
        let id = NativeListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push((element, id, listener));
        id
    }

    fn remove_scroll_listener(&self, element: ElementId, id: NativeListenerId) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|(e, i, _)| !(*e == element && *i == id));
    }

    fn release_element(&self, element: ElementId) {
        let mut state = self.state.borrow_mut();
        let released = match state.elements.get_mut(element.0) {
            Some(slot) => slot.take(),
            None => None,
        };
        let released = match released {
            Some(released) => released,
            None => return,
        };

        if let Some(p) = released.parent.and_then(|p| state.element_mut(p)) {
            p.children.retain(|&c| c != element);
        }
        for &child in &released.children {
            if let Some(c) = state.element_mut(child) {
                c.parent = None;
            }
        }

        state.listeners.retain(|(e, _, _)| *e != element);
        state.pending.retain(|&e| e != element);
    }

    fn name(&self) -> &str {
        "puppet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn scrollable(host: &PuppetHost, height: f64, inner: f64) -> ElementId {
        let frame = host.create_element("div");
        let spacer = host.create_element("div");
        host.append_child(frame, spacer);
        host.append_child(host.root(), frame);
        host.set_style(frame, StyleProperty::Height, &style::px(height));
        host.set_style(spacer, StyleProperty::Height, &style::px(inner));
        frame
    }

    #[test]
    fn clamps_offsets_to_the_scroll_range() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);

        host.set_scroll_top(frame, 500.0);
        assert_eq!(host.scroll_top(frame), 500.0);

        host.set_scroll_top(frame, 5000.0);
        assert_eq!(host.scroll_top(frame), 700.0);

        host.set_scroll_top(frame, -10.0);
        assert_eq!(host.scroll_top(frame), 0.0);
    }

    #[test]
    fn shrinking_content_clamps_and_queues_an_event() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);
        let spacer = host.children(frame)[0];

        host.set_scroll_top(frame, 700.0);
        host.flush();

        host.set_style(spacer, StyleProperty::Height, "400px");
        assert_eq!(host.scroll_top(frame), 100.0);
        assert_eq!(host.pending_events(), 1);
    }

    #[test]
    fn zoom_rounds_to_device_pixels() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);

        host.set_zoom(0.5);
        host.set_scroll_top(frame, 101.0);
        assert_eq!(host.scroll_top(frame), 102.0);
    }

    #[test]
    fn program_scrolls_are_queued_until_flush() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);
        let count = Rc::new(Cell::new(0));
        {
            let count = Rc::clone(&count);
            host.add_scroll_listener(frame, Rc::new(move || count.set(count.get() + 1)));
        }

        host.set_scroll_top(frame, 10.0);
        host.set_scroll_top(frame, 10.0);
        assert_eq!(count.get(), 0);

        assert_eq!(host.flush(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn removed_listeners_are_not_run() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);
        let count = Rc::new(Cell::new(0));
        let id = {
            let count = Rc::clone(&count);
            host.add_scroll_listener(frame, Rc::new(move || count.set(count.get() + 1)))
        };

        host.user_scroll(frame, 20.0);
        host.remove_scroll_listener(frame, id);
        host.user_scroll(frame, 40.0);

        assert_eq!(count.get(), 1);
        assert_eq!(host.scroll_listener_count(frame), 0);
    }

    #[test]
    fn remove_child_detaches() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);

        host.remove_child(host.root(), frame);
        assert_eq!(host.parent(frame), None);
        assert!(host.children(host.root()).is_empty());

        // Not a child anymore.
        host.remove_child(host.root(), frame);
    }

    #[test]
    fn released_elements_are_forgotten() {
        let host = PuppetHost::new();
        let frame = scrollable(&host, 300.0, 1000.0);
        let spacer = host.children(frame)[0];
        host.add_scroll_listener(frame, Rc::new(|| ()));
        host.set_scroll_top(frame, 10.0);

        host.release_element(frame);

        assert!(!host.is_alive(frame));
        assert!(host.is_alive(spacer));
        assert_eq!(host.parent(spacer), None);
        assert!(host.children(host.root()).is_empty());
        assert_eq!(host.scroll_listener_count(frame), 0);
        assert_eq!(host.pending_events(), 0);
        assert_eq!(host.scroll_top(frame), 0.0);

        // Ids are not reused.
        let other = host.create_element("div");
        assert_ne!(other, frame);

        // Twice is fine.
        host.release_element(frame);
    }
}
