// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tracing` output to the browser console.
//!
//! [`ConsoleLayer`] formats each event as one line,
//! `LEVEL target: message key=value ...`, and writes it with the console
//! method matching its level, so warnings and errors keep their styling in
//! the developer tools.

use std::fmt::{self, Write as _};

use folio_core::FolioError;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt as _};
use tracing_subscriber::util::SubscriberInitExt as _;
use wasm_bindgen::JsValue;

/// Where formatted lines go.
pub type Sink = fn(Level, &str);

/// A `tracing` layer writing to the developer console.
#[derive(Clone, Copy)]
pub struct ConsoleLayer {
    sink: Sink,
}

impl ConsoleLayer {
    /// Creates a layer writing to `console.error/warn/info/debug`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: write_console,
        }
    }

    /// Creates a layer handing every formatted line to `sink`.
    #[must_use]
    pub fn with_sink(sink: Sink) -> Self {
        Self { sink }
    }
}

impl Default for ConsoleLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLayer").finish_non_exhaustive()
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("{} {}: {}", metadata.level(), metadata.target(), visitor.message);
        line.push_str(&visitor.fields);
        (self.sink)(*metadata.level(), &line);
    }
}

/// Collects the message and the remaining fields of one event.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

fn write_console(level: Level, line: &str) {
    let line = JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}

/// Installs a global subscriber that writes events at or above `level` to
/// the console.
pub fn init_logging(level: LevelFilter) -> Result<(), FolioError> {
    tracing_subscriber::registry()
        .with(ConsoleLayer::new().with_filter(level))
        .try_init()
        .map_err(|e| FolioError::Host(format!("logging already initialized: {e}")))
}
