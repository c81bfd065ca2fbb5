use scroll_proxy::host::puppet::PuppetHost;
use scroll_proxy::{logger, Config, ScrollProxy};

use std::rc::Rc;

#[cfg(feature = "toml")]
fn load_config() -> Config {
    match std::env::args().nth(1) {
        Some(path) => scroll_proxy::config::load_config_file(&path)
            .unwrap_or_else(|err| {
                log::warn!("Using the default configuration: {}", err);
                Config::default()
            }),
        None => Config::default(),
    }
}

#[cfg(not(feature = "toml"))]
fn load_config() -> Config {
    Config::default()
}

fn main() {
    if let Err(err) = logger::init() {
        eprintln!("Could not install the logger: {}", err);
    }

    let config = load_config();

    // A 400x400 page where the platform draws overlay scrollbars.
    let host = Rc::new(PuppetHost::overlay());
    let proxy = ScrollProxy::with_config(host.clone(), host.root(), &config);

    proxy.on_scroll(|event| println!("scroll: {}", event.data));

    proxy.set_height(300.0);
    proxy.set_inner_height(1000.0);
    println!("measured scrollbar width: {}", proxy.width());
    println!("frame width: {}", host.width(proxy.frame()));

    // The editor jumps to the end, further than the content goes.
    proxy.set_scroll_top(5000.0);
    host.flush();

    // The user drags the scrollbar back up.
    host.user_scroll(proxy.frame(), 120.0);

    proxy.dispose();

    for record in logger::drain() {
        println!("{:5} {} | {}", record.level, record.target, record.message);
    }
}
