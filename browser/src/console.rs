//! Send `tracing` output to the browser console.

use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Collects one formatted event and logs it to the console when dropped.
pub struct ConsoleWriter {
    /// The level of the event being written
    level: Level,

    /// The formatted event so far
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();

        if line.is_empty() {
            return;
        }

        if self.level <= Level::WARN {
            web_sys::console::error_1(&line.into());
        } else {
            web_sys::console::log_1(&line.into());
        }
    }
}

/// Hands out a `ConsoleWriter` per event.
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Install a subscriber that logs to the console. Timestamps are left off;
/// the console adds its own, and `std::time` isn't available in the browser.
pub fn init() {
    let result = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_ansi(false)
        .without_time()
        .with_max_level(Level::DEBUG)
        .try_init();

    if let Err(err) = result {
        web_sys::console::warn_1(&format!("tracing was already set up: {err}").into());
    }
}
