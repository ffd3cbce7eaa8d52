//! Tracing output to the browser console.
//!
//! Each formatted event is buffered and handed to the `console` method that
//! matches its level when the writer is dropped, so errors logged by the
//! interaction layer show up as console errors.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

/// Console method an event is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Error,
    Warn,
    Info,
    Debug,
}

impl Method {
    fn for_level(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

pub(crate) struct ConsoleWriter {
    method: Method,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        let line = JsValue::from_str(text);
        match self.method {
            Method::Error => web_sys::console::error_1(&line),
            Method::Warn => web_sys::console::warn_1(&line),
            Method::Info => web_sys::console::info_1(&line),
            Method::Debug => web_sys::console::debug_1(&line),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            method: Method::Info,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            method: Method::for_level(*meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Install the global subscriber. Browsers have no clock the formatter can
/// read and no ANSI support, so both are off.
pub(crate) fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_console_methods() {
        assert_eq!(Method::for_level(Level::ERROR), Method::Error);
        assert_eq!(Method::for_level(Level::WARN), Method::Warn);
        assert_eq!(Method::for_level(Level::INFO), Method::Info);
        assert_eq!(Method::for_level(Level::DEBUG), Method::Debug);
        assert_eq!(Method::for_level(Level::TRACE), Method::Debug);
    }
}
