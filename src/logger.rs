//! Logging utilities.
//!
//! The scroll proxy and its hosts log through the [`log`] facade. This module
//! provides an optional sink keeping the latest records in memory, which the
//! demo binary prints and which an editor can show in a debug panel.

use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Number of records kept by [`init()`] and [`get_logger()`].
pub const DEFAULT_CAPACITY: usize = 1_000;

/// Saves all log records in a global deque.
pub struct ProxyLogger;

static LOGGER: ProxyLogger = ProxyLogger;

/// A log record.
#[derive(Clone, Debug)]
pub struct Record {
    /// Log level used for this record
    pub level: log::Level,
    /// Module that logged this record
    pub target: String,
    /// Time this message was logged
    pub time: time::OffsetDateTime,
    /// Message content
    pub message: String,
}

lazy_static! {
    /// Circular buffer for logs.
    pub static ref LOGS: Mutex<VecDeque<Record>> =
        Mutex::new(VecDeque::new());
}

fn logs() -> MutexGuard<'static, VecDeque<Record>> {
    // A panic while holding the lock only ever leaves a complete deque.
    LOGS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Log a record in the in-memory queue.
///
/// Once the reserved capacity is reached, the oldest record is dropped.
pub fn log(record: &log::Record<'_>) {
    let mut logs = logs();
    if logs.capacity() > 0 && logs.len() == logs.capacity() {
        logs.pop_front();
    }
    logs.push_back(Record {
        level: record.level(),
        target: record.target().to_string(),
        message: format!("{}", record.args()),
        time: time::OffsetDateTime::now_local()
            .unwrap_or_else(|_| time::OffsetDateTime::now_utc()),
    });
}

impl log::Log for ProxyLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        log(record);
    }

    fn flush(&self) {}
}

/// Initialize the in-memory logger, keeping every level.
///
/// Fails if another logger was already installed.
pub fn init() -> Result<(), log::SetLoggerError> {
    reserve_logs(DEFAULT_CAPACITY);

    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Return a logger that stores records in the in-memory queue.
///
/// Useful to combine it with other loggers. An easier alternative might be to
/// use [`init()`].
pub fn get_logger() -> ProxyLogger {
    reserve_logs(DEFAULT_CAPACITY);
    ProxyLogger
}

/// Adds `n` more entries to the log queue.
///
/// You should call this if you're not using `init()` nor `get_logger()`.
pub fn reserve_logs(n: usize) {
    logs().reserve(n);
}

/// Removes and returns every stored record, oldest first.
pub fn drain() -> Vec<Record> {
    logs().drain(..).collect()
}
