//! `log` backend writing to the browser console.
//!
//! Records are prefixed with their target so core messages stay
//! distinguishable from the host's own logging.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = JsValue::from_str(&format_record(record.target(), &record.args().to_string()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(target: &str, message: &str) -> String {
    format!("[{}] {}", target, message)
}

/// Install the console logger. Later calls only change the level.
pub(crate) fn install(level: LevelFilter) {
    // set_logger fails if a logger is already installed; that one stays.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Parse a level name, falling back to `Info` for anything unknown.
pub(crate) fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

/// Change how much the core logs to the console.
///
/// Accepts `off`, `error`, `warn`, `info`, `debug` or `trace`
/// (case-insensitive). Unknown names select `info`.
///
/// ```typescript
/// set_log_level('debug'); // show every crop mapping
/// ```
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    install(parse_level(level));
}
