//! Construction settings for the scroll proxy.
//!
//! The defaults keep a scrollbar visible on every platform:
//!
//! * Some platforms draw overlay scrollbars and report a width of 0. The frame
//!   then uses `fallback_min_width` so there is still something to grab.
//! * Some browsers hide the scrollbar of a zoomed page when the element is
//!   exactly as wide as the scrollbar. `padding_margin` is always added.
//!
//! ## Configuring with toml
//!
//! This requires the `toml` feature (enabled by default).
//!
//! Here are the possible entries (all fields are optional):
//!
//! ```toml
//! fallback_min_width = 15     # Width used when the scrollbar reports 0px
//! padding_margin = 5          # Extra width always added to the frame
//! frame_class = "ace_scrollbar"
//! spacer_class = "ace_scrollbar-inner"
//! ```

#[cfg(feature = "toml")]
use std::fmt;
#[cfg(feature = "toml")]
use std::fs::File;
#[cfg(feature = "toml")]
use std::io;
#[cfg(feature = "toml")]
use std::io::Read;
#[cfg(feature = "toml")]
use std::path::Path;

/// Settings used when building a [`ScrollProxy`](crate::ScrollProxy).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Width, in pixels, assumed when the measured scrollbar width is 0.
    pub fallback_min_width: f64,
    /// Width, in pixels, always added to the frame.
    pub padding_margin: f64,
    /// Class name given to the frame element.
    pub frame_class: String,
    /// Class name given to the spacer element.
    pub spacer_class: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fallback_min_width: 15.0,
            padding_margin: 5.0,
            frame_class: String::from("ace_scrollbar"),
            spacer_class: String::from("ace_scrollbar-inner"),
        }
    }
}

impl Config {
    /// Returns the CSS width of the frame for a measured scrollbar width.
    ///
    /// Only a width of 0 (or NaN) uses the fallback: other measurements are
    /// trusted as they are.
    pub fn frame_width(&self, measured: f64) -> f64 {
        let visible = if measured == 0.0 || measured.is_nan() {
            self.fallback_min_width
        } else {
            measured
        };
        visible + self.padding_margin
    }

    #[cfg(feature = "toml")]
    #[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "toml")))]
    /// Load values from an already parsed toml [`Table`], overwriting previous values.
    ///
    /// [`Table`]: https://docs.rs/toml/latest/toml/type.Table.html
    pub fn load_toml(&mut self, table: &toml::value::Table) {
        if let Some(width) = table.get("fallback_min_width").and_then(number)
        {
            self.fallback_min_width = width;
        }

        if let Some(margin) = table.get("padding_margin").and_then(number) {
            self.padding_margin = margin;
        }

        if let Some(toml::Value::String(class)) = table.get("frame_class") {
            self.frame_class = class.clone();
        }

        if let Some(toml::Value::String(class)) = table.get("spacer_class") {
            self.spacer_class = class.clone();
        }
    }
}

#[cfg(feature = "toml")]
fn number(value: &toml::Value) -> Option<f64> {
    match *value {
        toml::Value::Integer(i) => Some(i as f64),
        toml::Value::Float(f) => Some(f),
        _ => None,
    }
}

/// Possible error returned when loading a configuration.
#[cfg(feature = "toml")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "toml")))]
#[derive(Debug)]
pub enum Error {
    /// An error occurred when reading the file.
    Io(io::Error),

    /// An error occurred when parsing the toml content.
    Parse(toml::de::Error),
}

#[cfg(feature = "toml")]
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "could not read configuration: {}", err),
            Error::Parse(err) => {
                write!(f, "could not parse configuration: {}", err)
            }
        }
    }
}

#[cfg(feature = "toml")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

#[cfg(feature = "toml")]
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Parse(err)
    }
}

/// Loads a configuration from file.
///
/// Must have the `toml` feature enabled.
#[cfg(feature = "toml")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "toml")))]
pub fn load_config_file<P: AsRef<Path>>(filename: P) -> Result<Config, Error> {
    let content = {
        let mut content = String::new();
        let mut file = File::open(filename)?;
        file.read_to_string(&mut content)?;
        content
    };

    load_toml(&content)
}

/// Loads a configuration from a toml string.
///
/// Missing fields keep their default value.
///
/// Must have the `toml` feature enabled.
#[cfg(feature = "toml")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "toml")))]
pub fn load_toml(content: &str) -> Result<Config, Error> {
    let table = toml::de::from_str(content)?;

    let mut config = Config::default();
    config.load_toml(&table);

    Ok(config)
}
