//! # scroll-proxy
//!
//! A vertical scrollbar for text editor surfaces.
//!
//! The editor renders its content virtually, so it cannot rely on a native
//! scrollable element holding the whole document. Instead it places a
//! [`ScrollProxy`] next to the text: a thin, natively scrollable frame
//! containing an empty spacer as tall as the virtual content. The editor feeds
//! heights in and listens to `"scroll"` notifications to know where to render.
//!
//! The proxy doesn't touch any platform directly: it delegates this job to a
//! [`VisualHost`](host::VisualHost), which creates elements, applies styles and
//! delivers native scroll events.
//!
//! ## Example
//!
//! ```rust
//! use scroll_proxy::host::puppet::PuppetHost;
//! use scroll_proxy::ScrollProxy;
//! use std::rc::Rc;
//!
//! let host = Rc::new(PuppetHost::new());
//! let parent = host.root();
//!
//! let proxy = ScrollProxy::new(host.clone(), parent);
//! proxy.set_height(300.0);
//! proxy.set_inner_height(1000.0);
//!
//! let _listener = proxy.on_scroll(|event| println!("Scrolled to {}", event.data));
//!
//! // The user drags the scrollbar.
//! host.user_scroll(proxy.frame(), 120.0);
//! assert_eq!(proxy.scroll_top(), 120.0);
//! ```
#![deny(missing_docs)]
#![cfg_attr(feature = "doc-cfg", feature(doc_cfg))]

macro_rules! new_default(
    ($c:ident<$t:ident>) => {
        impl<$t> Default for $c<$t> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    ($c:ty) => {
        impl Default for $c {
            fn default() -> Self {
                Self::new()
            }
        }
    }
);

pub mod config;
pub mod emitter;
pub mod event;
pub mod host;
pub mod logger;
pub mod style;

mod scroll_proxy;

pub use self::config::Config;
pub use self::emitter::{EventEmitter, Subscribable};
pub use self::event::{Listener, ScrollEvent};
pub use self::scroll_proxy::ScrollProxy;
