use crate::config::Config;
use crate::emitter::{EventEmitter, Subscribable};
use crate::event::{self, Listener, ScrollEvent};
use crate::host::{ElementId, NativeListenerId, StyleProperty, VisualHost};
use crate::style;

use std::cell::Cell;
use std::rc::Rc;

struct Inner {
    host: Rc<dyn VisualHost>,
    parent: ElementId,
    frame: ElementId,
    spacer: ElementId,
    width: f64,
    emitter: EventEmitter<ScrollEvent>,
    native_listener: Cell<Option<NativeListenerId>>,
    disposed: Cell<bool>,
}

impl Inner {
    fn on_native_scroll(&self) {
        // Always read the offset again: it may have moved since the event
        // was queued.
        let event = ScrollEvent::new(self.host.scroll_top(self.frame));
        log::trace!("Scroll proxy {}: scrolled to {}", self.frame, event.data);
        self.emitter.emit(event::SCROLL, &event);
    }
}

/// Vertical scrollbar standing in for a virtually rendered surface.
///
/// It owns two elements on its host:
///
/// * the frame, a thin natively scrollable element, and
/// * the spacer, an empty child of the frame whose height is the height of the
///   virtual content.
///
/// The editor sets both heights, moves the scrollbar with
/// [`set_scroll_top`](ScrollProxy::set_scroll_top), and learns about user
/// scrolling through `"scroll"` notifications carrying the new offset.
///
/// # Examples
///
/// ```rust
/// use scroll_proxy::host::puppet::PuppetHost;
/// use scroll_proxy::ScrollProxy;
/// use std::rc::Rc;
///
/// let host = Rc::new(PuppetHost::new());
/// let proxy = ScrollProxy::new(host.clone(), host.root());
///
/// proxy.set_height(300.0);
/// proxy.set_inner_height(1000.0);
/// proxy.set_scroll_top(5000.0);
///
/// // The platform only scrolls as far as the content goes.
/// assert_eq!(proxy.scroll_top(), 700.0);
/// ```
pub struct ScrollProxy {
    inner: Rc<Inner>,
}

impl ScrollProxy {
    /// Creates a new `ScrollProxy` with the default [`Config`], and appends it
    /// to `parent`.
    pub fn new(host: Rc<dyn VisualHost>, parent: ElementId) -> Self {
        Self::with_config(host, parent, &Config::default())
    }

    /// Creates a new `ScrollProxy` and appends it to `parent`.
    ///
    /// The scrollbar width is measured once, here. The frame is made wide
    /// enough to show a scrollbar even when the platform reports a width of 0.
    pub fn with_config(
        host: Rc<dyn VisualHost>,
        parent: ElementId,
        config: &Config,
    ) -> Self {
        let frame = host.create_element("div");
        host.set_class_name(frame, &config.frame_class);

        let spacer = host.create_element("div");
        host.set_class_name(spacer, &config.spacer_class);
        host.append_child(frame, spacer);

        host.append_child(parent, frame);

        let width = host.scrollbar_width(parent);
        let frame_width = config.frame_width(width);
        host.set_style(frame, StyleProperty::Width, &style::px(frame_width));

        log::debug!(
            "Scroll proxy {} on {} host: scrollbar is {}px, frame is {}px wide",
            frame,
            host.name(),
            width,
            frame_width
        );

        let inner = Rc::new(Inner {
            host,
            parent,
            frame,
            spacer,
            width,
            emitter: EventEmitter::new(),
            native_listener: Cell::new(None),
            disposed: Cell::new(false),
        });

        // The host keeps the listener alive: only give it a weak reference.
        let weak = Rc::downgrade(&inner);
        let id = inner.host.add_scroll_listener(
            frame,
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_native_scroll();
                }
            }),
        );
        inner.native_listener.set(Some(id));

        ScrollProxy { inner }
    }

    /// Returns the measured width of the scrollbar, in pixels.
    ///
    /// This is 0 on platforms with overlay scrollbars, even though the frame
    /// itself is always wider.
    pub fn width(&self) -> f64 {
        self.inner.width
    }

    /// Sets the height of the scrollbar, in pixels.
    pub fn set_height(&self, height: f64) {
        self.set_px(self.inner.frame, height);
    }

    /// Sets the height of the virtual content, in pixels.
    ///
    /// The scrollbar can scroll from 0 to `inner_height - height`.
    pub fn set_inner_height(&self, height: f64) {
        self.set_px(self.inner.spacer, height);
    }

    /// Scrolls to the given offset, in pixels.
    ///
    /// The platform decides where the frame ends up: it will clamp the value
    /// to the scroll range, and may round it at some zoom levels. Use
    /// [`scroll_top`](ScrollProxy::scroll_top) to know the actual offset.
    ///
    /// If the offset changes, the host will deliver a native scroll event,
    /// which turns into a `"scroll"` notification.
    pub fn set_scroll_top(&self, scroll_top: f64) {
        if self.is_disposed() {
            return;
        }
        self.inner.host.set_scroll_top(self.inner.frame, scroll_top);
    }

    /// Returns the current scroll offset, in pixels, as the platform reports it.
    pub fn scroll_top(&self) -> f64 {
        self.inner.host.scroll_top(self.inner.frame)
    }

    /// Returns the frame element.
    pub fn frame(&self) -> ElementId {
        self.inner.frame
    }

    /// Returns the spacer element, child of the frame.
    pub fn spacer(&self) -> ElementId {
        self.inner.spacer
    }

    /// Runs `f` on every `"scroll"` notification.
    ///
    /// Returns the listener, to give to [`Subscribable::unsubscribe`].
    pub fn on_scroll<F>(&self, f: F) -> Listener<ScrollEvent>
    where
        F: 'static + Fn(&ScrollEvent),
    {
        let listener = Listener::from_fn(f);
        self.subscribe(event::SCROLL, listener.clone());
        listener
    }

    /// Returns the number of listeners registered for `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.inner.emitter.listener_count(event_name)
    }

    /// Detaches the scrollbar from the page.
    ///
    /// Stops listening to native scroll events, drops every listener, removes
    /// the frame from its parent and lets the host free both elements.
    /// Calling it again does nothing, and so do the setters from now on.
    ///
    /// This is also done when the `ScrollProxy` is dropped.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }

        let host = &self.inner.host;
        if let Some(id) = self.inner.native_listener.take() {
            host.remove_scroll_listener(self.inner.frame, id);
        }
        host.remove_child(self.inner.parent, self.inner.frame);
        host.release_element(self.inner.spacer);
        host.release_element(self.inner.frame);
        self.inner.emitter.clear();

        log::debug!("Scroll proxy {}: disposed", self.inner.frame);
    }

    /// Returns `true` once [`dispose`](ScrollProxy::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    fn set_px(&self, element: ElementId, value: f64) {
        if self.is_disposed() {
            return;
        }
        self.inner
            .host
            .set_style(element, StyleProperty::Height, &style::px(value));
    }
}

impl Subscribable for ScrollProxy {
    type Payload = ScrollEvent;

    fn subscribe(&self, event_name: &str, listener: Listener<ScrollEvent>) {
        self.inner.emitter.subscribe(event_name, listener);
    }

    fn unsubscribe(&self, event_name: &str, listener: &Listener<ScrollEvent>) {
        self.inner.emitter.unsubscribe(event_name, listener);
    }
}

impl Drop for ScrollProxy {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::puppet::{PuppetHost, ScrollDelivery};
    use rand::Rng;
    use std::cell::RefCell;

    fn setup() -> (Rc<PuppetHost>, ScrollProxy) {
        let host = Rc::new(PuppetHost::new());
        let proxy = ScrollProxy::new(host.clone(), host.root());
        (host, proxy)
    }

    fn record(proxy: &ScrollProxy) -> (Rc<RefCell<Vec<f64>>>, Listener<ScrollEvent>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let listener = {
            let seen = Rc::clone(&seen);
            proxy.on_scroll(move |e| seen.borrow_mut().push(e.data))
        };
        (seen, listener)
    }

    #[test]
    fn construction_builds_the_element_tree() {
        let (host, proxy) = setup();

        assert_eq!(host.children(host.root()), vec![proxy.frame()]);
        assert_eq!(host.children(proxy.frame()), vec![proxy.spacer()]);
        assert_eq!(host.tag(proxy.frame()), "div");
        assert_eq!(host.class_name(proxy.frame()), "ace_scrollbar");
        assert_eq!(host.class_name(proxy.spacer()), "ace_scrollbar-inner");
        assert_eq!(host.scroll_listener_count(proxy.frame()), 1);
    }

    #[test]
    fn frame_width_adds_the_margin() {
        let (host, proxy) = setup();

        assert_eq!(proxy.width(), 17.0);
        assert_eq!(
            host.style(proxy.frame(), StyleProperty::Width).as_deref(),
            Some("22px")
        );
    }

    #[test]
    fn overlay_scrollbars_use_the_fallback_width() {
        let host = Rc::new(PuppetHost::overlay());
        let proxy = ScrollProxy::new(host.clone(), host.root());

        assert_eq!(proxy.width(), 0.0);
        assert_eq!(
            host.style(proxy.frame(), StyleProperty::Width).as_deref(),
            Some("20px")
        );
    }

    #[test]
    fn config_changes_the_frame() {
        let host = Rc::new(PuppetHost::overlay());
        let config = Config {
            fallback_min_width: 10.0,
            padding_margin: 1.0,
            frame_class: "bar".into(),
            spacer_class: "bar-inner".into(),
        };
        let proxy = ScrollProxy::with_config(host.clone(), host.root(), &config);

        assert_eq!(host.width(proxy.frame()), 11.0);
        assert_eq!(host.class_name(proxy.frame()), "bar");
        assert_eq!(host.class_name(proxy.spacer()), "bar-inner");
    }

    #[test]
    fn width_never_changes() {
        let (host, proxy) = setup();
        let width = proxy.width();

        proxy.set_height(120.0);
        proxy.set_inner_height(4000.0);
        host.user_scroll(proxy.frame(), 300.0);

        assert_eq!(proxy.width(), width);
        assert_eq!(proxy.width(), width);
    }

    #[test]
    fn heights_are_mirrored() {
        let (host, proxy) = setup();
        let mut rng = rand::thread_rng();

        for _ in 0..100 {
            let height = rng.gen_range(0..10_000) as f64;
            let inner = rng.gen_range(0.0..100_000.0);

            proxy.set_height(height);
            proxy.set_inner_height(inner);

            assert_eq!(host.height(proxy.frame()), height);
            assert_eq!(host.height(proxy.spacer()), inner);
        }

        proxy.set_height(1.5);
        assert_eq!(
            host.style(proxy.frame(), StyleProperty::Height).as_deref(),
            Some("1.5px")
        );
    }

    #[test]
    fn one_notification_per_native_event() {
        let (host, proxy) = setup();
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);
        let (seen, _listener) = record(&proxy);

        host.user_scroll(proxy.frame(), 100.0);
        host.user_scroll(proxy.frame(), 250.0);
        host.fire_scroll(proxy.frame());

        assert_eq!(*seen.borrow(), vec![100.0, 250.0, 250.0]);
    }

    #[test]
    fn notifications_read_the_offset_when_emitted() {
        let (host, proxy) = setup();
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);
        let (seen, _listener) = record(&proxy);

        proxy.set_scroll_top(100.0);
        proxy.set_scroll_top(200.0);
        assert!(seen.borrow().is_empty());

        // Both events are delivered after the second move.
        assert_eq!(host.flush(), 2);
        assert_eq!(*seen.borrow(), vec![200.0, 200.0]);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let (host, proxy) = setup();
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);

        let order = Rc::new(RefCell::new(Vec::new()));
        for name in vec!["first", "second"] {
            let order = Rc::clone(&order);
            proxy.on_scroll(move |_| order.borrow_mut().push(name));
        }

        host.user_scroll(proxy.frame(), 10.0);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_listeners_hear_nothing() {
        let (host, proxy) = setup();
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);
        let (seen, listener) = record(&proxy);

        host.user_scroll(proxy.frame(), 10.0);
        proxy.unsubscribe(event::SCROLL, &listener);
        host.user_scroll(proxy.frame(), 20.0);

        assert_eq!(*seen.borrow(), vec![10.0]);
        assert_eq!(proxy.listener_count(event::SCROLL), 0);

        // Unknown listeners are fine.
        proxy.unsubscribe(event::SCROLL, &Listener::dummy());
    }

    #[test]
    fn scroll_top_is_clamped_by_the_platform() {
        let (host, proxy) = setup();

        assert!(proxy.width() >= 0.0);
        proxy.set_height(300.0);
        assert_eq!(host.height(proxy.frame()), 300.0);

        proxy.set_inner_height(1000.0);
        proxy.set_scroll_top(500.0);
        assert!(proxy.scroll_top() <= 700.0);

        proxy.set_scroll_top(900.0);
        assert_eq!(proxy.scroll_top(), 700.0);
    }

    #[test]
    fn zoomed_offsets_are_reported_as_is() {
        let (host, proxy) = setup();
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);
        host.set_zoom(0.5);

        proxy.set_scroll_top(101.0);
        assert_eq!(proxy.scroll_top(), 102.0);
    }

    #[test]
    fn reentrant_scroll_produces_a_second_notification() {
        let host = Rc::new(PuppetHost::new());
        let proxy = Rc::new(ScrollProxy::new(host.clone(), host.root()));
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            let weak = Rc::downgrade(&proxy);
            proxy.on_scroll(move |e| {
                seen.borrow_mut().push(e.data);
                // Snap to multiples of 100.
                if let Some(proxy) = weak.upgrade() {
                    proxy.set_scroll_top((e.data / 100.0).floor() * 100.0);
                }
            });
        }

        host.user_scroll(proxy.frame(), 250.0);
        assert_eq!(*seen.borrow(), vec![250.0]);

        assert_eq!(host.flush(), 1);
        assert_eq!(*seen.borrow(), vec![250.0, 200.0]);
    }

    #[test]
    fn immediate_delivery_reenters_synchronously() {
        let host = Rc::new(PuppetHost::new());
        host.set_delivery(ScrollDelivery::Immediate);
        let proxy = Rc::new(ScrollProxy::new(host.clone(), host.root()));
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            let weak = Rc::downgrade(&proxy);
            proxy.on_scroll(move |e| {
                seen.borrow_mut().push(e.data);
                if let Some(proxy) = weak.upgrade() {
                    proxy.set_scroll_top(0.0);
                }
            });
        }

        host.user_scroll(proxy.frame(), 50.0);
        assert_eq!(*seen.borrow(), vec![50.0, 0.0]);
    }

    #[test]
    fn dispose_detaches_everything() {
        let (host, proxy) = setup();
        proxy.set_height(300.0);
        proxy.set_inner_height(1000.0);
        let (seen, _listener) = record(&proxy);
        let frame = proxy.frame();
        let spacer = proxy.spacer();

        proxy.dispose();
        assert!(proxy.is_disposed());
        assert!(host.children(host.root()).is_empty());
        assert_eq!(host.scroll_listener_count(frame), 0);
        assert_eq!(proxy.listener_count(event::SCROLL), 0);

        // The host does not hold on to either element.
        assert!(!host.is_alive(frame));
        assert!(!host.is_alive(spacer));

        host.user_scroll(frame, 100.0);
        host.fire_scroll(frame);
        assert!(seen.borrow().is_empty());

        // Again, and setters are ignored.
        proxy.dispose();
        proxy.set_height(10.0);
        proxy.set_inner_height(10.0);
        proxy.set_scroll_top(10.0);
        assert_eq!(proxy.scroll_top(), 0.0);
        assert_eq!(host.pending_events(), 0);
    }

    #[test]
    fn drop_disposes() {
        let host = Rc::new(PuppetHost::new());
        let frame = {
            let proxy = ScrollProxy::new(host.clone(), host.root());
            proxy.frame()
        };

        assert!(host.children(host.root()).is_empty());
        assert_eq!(host.scroll_listener_count(frame), 0);
        assert!(!host.is_alive(frame));
    }

    #[test]
    fn negative_measurements_are_kept() {
        let host = Rc::new(PuppetHost::with_scrollbar_width(-3.0));
        let proxy = ScrollProxy::new(host.clone(), host.root());

        assert_eq!(proxy.width(), -3.0);
        assert_eq!(
            host.style(proxy.frame(), StyleProperty::Width).as_deref(),
            Some("2px")
        );
    }
}
