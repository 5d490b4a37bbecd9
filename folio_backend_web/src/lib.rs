// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host for folio.
//!
//! This crate implements the `folio_core` ports on top of browser APIs:
//!
//! - [`DomPort`]: [`UiPort`] over the live document, including
//!   `IntersectionObserver` when the browser has one
//! - [`WindowTimers`]: [`Timers`] over `setTimeout` / `clearTimeout`
//! - [`LocalStore`]: [`PreferenceStore`] over `localStorage`
//! - [`ConsoleLayer`] and [`init_logging`]: `tracing` output to the
//!   developer console
//!
//! Unlike `folio_core`, this crate needs `std`: the `tracing-subscriber`
//! registry behind [`init_logging`] does.
//!
//! [`UiPort`]: folio_core::ui::UiPort
//! [`Timers`]: folio_core::timer::Timers
//! [`PreferenceStore`]: folio_core::store::PreferenceStore

mod console;
mod dom;
mod storage;
mod timers;

pub use console::{ConsoleLayer, init_logging};
pub use dom::DomPort;
pub use storage::LocalStore;
pub use timers::WindowTimers;

use folio_core::FolioError;
use folio_core::time::HostTime;
use wasm_bindgen::JsValue;

/// Returns the current host time from `performance.now()`, in whole
/// milliseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime(millis_from_js(timers::performance_now()))
}

/// Converts a `DOMHighResTimeStamp` to whole milliseconds.
fn millis_from_js(ms: f64) -> u64 {
    if !ms.is_finite() || ms <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "positive, finite, and far below u64::MAX for any page lifetime"
    )]
    let whole = ms as u64;
    whole
}

/// Describes a thrown JS value.
pub(crate) fn js_detail(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Wraps a thrown JS value as a host error.
pub(crate) fn host_error(context: &str, err: &JsValue) -> FolioError {
    FolioError::Host(format!("{context}: {}", js_detail(err)))
}
