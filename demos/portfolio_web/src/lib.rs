// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Portfolio page demo.
//!
//! Loads the bundled publication and skill data, then starts every folio
//! controller against the live document once it has been parsed. Serve
//! `index.html` next to the `wasm-bindgen` output to try it.

#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

use folio_backend_web::{DomPort, LocalStore, WindowTimers, init_logging};
use folio_core::FolioError;
use folio_core::content::Portfolio;
use folio_core::page::{FolioConfig, Page};
use folio_core::store::{MemoryStore, PreferenceStore};
use rand::SeedableRng as _;
use rand::rngs::SmallRng;
use tracing::level_filters::LevelFilter;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::ErrorEvent;

/// Publications and skills shipped with the page.
const PORTFOLIO_JSON: &str = include_str!("../data/portfolio.json");

/// Parses the bundled portfolio data.
fn bundled_portfolio() -> Result<Portfolio, FolioError> {
    serde_json::from_str(PORTFOLIO_JSON)
        .map_err(|e| FolioError::Host(format!("portfolio.json: {e}")))
}

fn to_js(err: FolioError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Seeds the particle layout from `Math.random`.
fn seed_from_unit(unit: f64) -> u64 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "unit is in [0, 1), so the product fits in 53 bits"
    )]
    let seed = (unit * (1_u64 << 53) as f64) as u64;
    seed
}

fn start_page<S: PreferenceStore + Clone + 'static>(ui: &DomPort, store: S) {
    let content = bundled_portfolio()
        .inspect_err(|e| tracing::error!(error = %e, "bundled portfolio data is invalid"))
        .ok();
    let timers = WindowTimers::new();
    let mut rng = SmallRng::seed_from_u64(seed_from_unit(js_sys::Math::random()));
    let year = js_sys::Date::new_0().get_full_year();

    let page = Page::init(
        ui,
        &timers,
        store,
        content.as_ref(),
        &mut rng,
        year,
        &FolioConfig::portfolio(),
    );
    tracing::info!(
        particles = page.particles,
        tooltips = page.tooltips,
        cycling = page.cycler.is_some(),
        "portfolio ready"
    );
    // Listeners and timers keep their own handles; the page lives until unload.
    core::mem::forget(page);
}

fn start(ui: &DomPort) {
    match LocalStore::new() {
        Ok(store) => start_page(ui, store),
        Err(e) => {
            tracing::warn!(error = %e, "theme preference will not persist");
            start_page(ui, MemoryStore::new());
        }
    }
}

fn install_error_reporting(ui: &DomPort) -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "panic");
    }));

    let on_error = Closure::wrap(Box::new(|event: ErrorEvent| {
        tracing::error!(
            message = %event.message(),
            file = %event.filename(),
            line = event.lineno(),
            "uncaught error"
        );
    }) as Box<dyn FnMut(ErrorEvent)>);
    ui.window()
        .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
    on_error.forget();
    Ok(())
}

/// Entry point: installs logging, then starts the page once the document
/// is parsed.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    init_logging(LevelFilter::INFO).map_err(to_js)?;
    let ui = DomPort::new().map_err(to_js)?;
    install_error_reporting(&ui)?;

    if ui.document().ready_state() == "loading" {
        let deferred = ui.clone();
        let on_ready = Closure::once(move || start(&deferred));
        ui.document().add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        )?;
        on_ready.forget();
    } else {
        start(&ui);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_data_parses() {
        let portfolio = bundled_portfolio().unwrap();
        assert_eq!(portfolio.publications.len(), 7);
        assert_eq!(portfolio.skills.len(), 11);
        assert_eq!(
            portfolio.categories(),
            ["medical-imaging", "neuroscience", "clinical"]
        );
        assert!(portfolio.publications.iter().all(|p| p.url.starts_with("https://")));
    }

    #[test]
    fn seeds_span_53_bits() {
        assert_eq!(seed_from_unit(0.0), 0);
        assert_eq!(seed_from_unit(0.5), 1 << 52);
        assert!(seed_from_unit(0.999_999) < 1 << 53);
    }
}
