//! Thread-local log capture, so parallel tests do not see each other's lines.

use std::cell::RefCell;

use log::{LevelFilter, Log, Metadata, Record};

thread_local! {
    static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Installs the capturing logger and clears this thread's lines.
pub fn capture() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    LINES.with(|lines| lines.borrow_mut().clear());
}

/// Lines logged on this thread since [`capture`].
pub fn lines() -> Vec<String> {
    LINES.with(|lines| lines.borrow().clone())
}

/// Index of the first line containing `needle`.
pub fn position(needle: &str) -> Option<usize> {
    lines().iter().position(|line| line.contains(needle))
}
