// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-triggered reveal of timeline entries.
//!
//! A [`VisibilityWatcher`] marks each item visible the first time it enters
//! the trigger zone: at least [`threshold`](ObserverOptions::threshold) of the
//! item inside a viewport whose bottom is cut by
//! [`bottom_margin`](ObserverOptions::bottom_margin).
//!
//! Two strategies sit behind the trait, chosen once by [`select_watcher`]:
//!
//! - [`ObserverBased`] hands the items to the host's intersection observer.
//! - [`PolledFallback`] checks geometry on window `load` and on debounced
//!   window `scroll`.
//!
//! Both run one geometric check right away, each with its own trigger rule,
//! so items already on screen are revealed without waiting for user input.
//! Visibility is monotonic: an item that has been revealed is never checked
//! again and never hidden.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::debounce::Debounce;
use crate::error::FolioError;
use crate::time::Duration;
use crate::timer::Timers;
use crate::ui::{EventKind, EventTarget, Intersection, ObserverOptions, UiEvent, UiPort};

/// Configuration for scroll reveal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Class selecting the items to watch.
    pub item_class: &'static str,
    /// Class added to an item once it is revealed.
    pub visible_class: &'static str,
    /// Trigger zone for the observer strategy.
    pub options: ObserverOptions,
    /// Fraction of the viewport height an item's top edge must be above for
    /// the geometric check.
    pub fold_ratio: f64,
    /// Quiet period for the debounced scroll check.
    pub debounce_wait: Duration,
}

impl RevealConfig {
    /// Timeline settings used by the portfolio page.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            item_class: "timeline-item",
            visible_class: "visible",
            options: ObserverOptions {
                threshold: 0.2,
                bottom_margin: 0.2,
            },
            fold_ratio: 0.8,
            debounce_wait: Duration(100),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Fraction of an element inside a viewport whose bottom `bottom_margin`
/// (as a fraction of the viewport height) is excluded.
///
/// `top` is relative to the viewport. A zero-height element counts as fully
/// inside when its top lies within the zone.
#[must_use]
pub fn intersection_ratio(top: f64, height: f64, viewport_height: f64, bottom_margin: f64) -> f64 {
    let zone_bottom = viewport_height * (1.0 - bottom_margin);
    if height <= 0.0 {
        return if top >= 0.0 && top < zone_bottom { 1.0 } else { 0.0 };
    }
    let visible = (top + height).min(zone_bottom) - top.max(0.0);
    (visible / height).clamp(0.0, 1.0)
}

/// Returns `true` if an element at `top` with the given `height` is inside
/// the observer trigger zone described by `options`.
#[must_use]
pub fn in_trigger_zone(
    top: f64,
    height: f64,
    viewport_height: f64,
    options: ObserverOptions,
) -> bool {
    let ratio = intersection_ratio(top, height, viewport_height, options.bottom_margin);
    ratio > 0.0 && ratio >= options.threshold
}

/// Returns `true` if an element whose top edge is at `top` (relative to the
/// viewport) is above `fold_ratio` of the viewport height.
#[must_use]
pub fn top_within_fold(top: f64, viewport_height: f64, fold_ratio: f64) -> bool {
    top < viewport_height * fold_ratio
}

/// An element tracked by a watcher.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealableItem<E> {
    element: E,
    visible: bool,
}

impl<E> RevealableItem<E> {
    /// Starts tracking `element`, not yet visible.
    #[must_use]
    pub fn new(element: E) -> Self {
        Self {
            element,
            visible: false,
        }
    }

    /// Returns the element.
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Returns `true` once the item has been revealed.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Marks the item visible. Returns `true` only on the first call.
    pub fn reveal(&mut self) -> bool {
        !core::mem::replace(&mut self.visible, true)
    }
}

/// Which detection strategy a watcher uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Host intersection observer.
    Observer,
    /// Geometry polling on scroll and load.
    Polling,
}

/// Marks elements visible once they scroll into the trigger zone.
pub trait VisibilityWatcher<E> {
    /// Starts watching `elements`.
    fn watch(&mut self, elements: Vec<E>) -> Result<(), FolioError>;

    /// Returns a snapshot of every watched item.
    fn items(&self) -> Vec<RevealableItem<E>>;

    /// Returns the strategy in use.
    fn strategy(&self) -> Strategy;
}

type Items<E> = Rc<RefCell<Vec<RevealableItem<E>>>>;

fn reveal_at<U: UiPort>(ui: &U, items: &Items<U::Element>, idx: usize, config: &RevealConfig) {
    let element = {
        let mut items = items.borrow_mut();
        let item = &mut items[idx];
        if !item.reveal() {
            return;
        }
        item.element.clone()
    };
    if let Err(err) = ui.add_class(&element, config.visible_class) {
        tracing::warn!(%err, "failed to mark timeline item visible");
    }
}

/// Reveals every hidden item for which `due` holds.
fn reveal_where<U: UiPort>(
    ui: &U,
    items: &Items<U::Element>,
    config: &RevealConfig,
    due: impl Fn(&U::Element) -> bool,
) {
    let hits: Vec<usize> = items
        .borrow()
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.visible && due(&item.element))
        .map(|(i, _)| i)
        .collect();
    for idx in hits {
        reveal_at(ui, items, idx, config);
    }
}

/// Reveals every hidden item whose top edge is above the fold.
fn check_fold<U: UiPort>(ui: &U, items: &Items<U::Element>, config: &RevealConfig) {
    let viewport = ui.viewport_height();
    reveal_where(ui, items, config, |el| {
        top_within_fold(ui.element_top(el), viewport, config.fold_ratio)
    });
}

/// Reveals every hidden item already inside the observer trigger zone.
fn check_zone<U: UiPort>(ui: &U, items: &Items<U::Element>, config: &RevealConfig) {
    let viewport = ui.viewport_height();
    reveal_where(ui, items, config, |el| {
        in_trigger_zone(ui.element_top(el), ui.element_height(el), viewport, config.options)
    });
}

/// Watcher backed by the host's intersection observer.
pub struct ObserverBased<U: UiPort> {
    ui: U,
    config: RevealConfig,
    items: Items<U::Element>,
}

impl<U: UiPort> ObserverBased<U> {
    /// Creates an idle watcher.
    #[must_use]
    pub fn new(ui: &U, config: RevealConfig) -> Self {
        Self {
            ui: ui.clone(),
            config,
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<U: UiPort> VisibilityWatcher<U::Element> for ObserverBased<U> {
    fn watch(&mut self, elements: Vec<U::Element>) -> Result<(), FolioError> {
        self.items
            .borrow_mut()
            .extend(elements.iter().cloned().map(RevealableItem::new));
        check_zone(&self.ui, &self.items, &self.config);

        let ui = self.ui.clone();
        let items = Rc::clone(&self.items);
        let config = self.config;
        self.ui.observe_intersections(
            &elements,
            self.config.options,
            Box::new(move |entries: &[Intersection<U::Element>]| {
                for entry in entries.iter().filter(|e| e.is_intersecting) {
                    let idx = items
                        .borrow()
                        .iter()
                        .position(|item| item.element == entry.target && !item.visible);
                    if let Some(idx) = idx {
                        reveal_at(&ui, &items, idx, &config);
                    }
                }
            }),
        )
    }

    fn items(&self) -> Vec<RevealableItem<U::Element>> {
        self.items.borrow().clone()
    }

    fn strategy(&self) -> Strategy {
        Strategy::Observer
    }
}

impl<U: UiPort> fmt::Debug for ObserverBased<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverBased")
            .field("config", &self.config)
            .field("items", &self.items.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Watcher that polls geometry on `load` and debounced `scroll`.
pub struct PolledFallback<U: UiPort, T: Timers> {
    ui: U,
    timers: T,
    config: RevealConfig,
    items: Items<U::Element>,
    scroll_check: Option<Debounce<T, ()>>,
}

impl<U: UiPort, T: Timers> PolledFallback<U, T> {
    /// Creates an idle watcher.
    #[must_use]
    pub fn new(ui: &U, timers: &T, config: RevealConfig) -> Self {
        Self {
            ui: ui.clone(),
            timers: timers.clone(),
            config,
            items: Rc::new(RefCell::new(Vec::new())),
            scroll_check: None,
        }
    }

    /// Returns the debounced scroll check once [`watch`](VisibilityWatcher::watch)
    /// has been called.
    #[must_use]
    pub fn scroll_check(&self) -> Option<&Debounce<T, ()>> {
        self.scroll_check.as_ref()
    }
}

impl<U: UiPort, T: Timers> VisibilityWatcher<U::Element> for PolledFallback<U, T> {
    fn watch(&mut self, elements: Vec<U::Element>) -> Result<(), FolioError> {
        self.items
            .borrow_mut()
            .extend(elements.into_iter().map(RevealableItem::new));

        let (ui, items, config) = (self.ui.clone(), Rc::clone(&self.items), self.config);
        let debounced = Debounce::new(&self.timers, self.config.debounce_wait, move |()| {
            check_fold(&ui, &items, &config);
        });
        let on_scroll = debounced.clone();
        self.ui.on(
            EventTarget::Window,
            EventKind::Scroll,
            Box::new(move |_: &UiEvent<U::Element>| on_scroll.call(())),
        )?;
        self.scroll_check = Some(debounced);

        let (ui, items, config) = (self.ui.clone(), Rc::clone(&self.items), self.config);
        self.ui.on(
            EventTarget::Window,
            EventKind::Load,
            Box::new(move |_: &UiEvent<U::Element>| check_fold(&ui, &items, &config)),
        )?;

        check_fold(&self.ui, &self.items, &self.config);
        Ok(())
    }

    fn items(&self) -> Vec<RevealableItem<U::Element>> {
        self.items.borrow().clone()
    }

    fn strategy(&self) -> Strategy {
        Strategy::Polling
    }
}

impl<U: UiPort, T: Timers> fmt::Debug for PolledFallback<U, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolledFallback")
            .field("config", &self.config)
            .field("items", &self.items.borrow().len())
            .field("scroll_check", &self.scroll_check)
            .finish_non_exhaustive()
    }
}

/// Picks the watcher strategy by probing the host.
pub fn select_watcher<U: UiPort, T: Timers>(
    ui: &U,
    timers: &T,
    config: RevealConfig,
) -> Box<dyn VisibilityWatcher<U::Element>> {
    if ui.supports_intersection_observer() {
        Box::new(ObserverBased::new(ui, config))
    } else {
        tracing::debug!("no intersection observer; polling on scroll");
        Box::new(PolledFallback::new(ui, timers, config))
    }
}

/// Watches every element carrying the configured item class.
///
/// Returns `Ok(None)` when the page has no such elements.
pub fn reveal_page<U: UiPort, T: Timers>(
    ui: &U,
    timers: &T,
    config: RevealConfig,
) -> Result<Option<Box<dyn VisibilityWatcher<U::Element>>>, FolioError> {
    let elements = ui.elements_by_class(config.item_class);
    if elements.is_empty() {
        tracing::debug!(class = config.item_class, "no items to reveal");
        return Ok(None);
    }
    let mut watcher = select_watcher(ui, timers, config);
    watcher.watch(elements)?;
    Ok(Some(watcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessPage, ManualTimers, NodeId};
    use crate::ui::Fragment;

    /// Five timeline items stacked 300px apart starting at y=100.
    fn timeline(page: &HeadlessPage) -> Vec<NodeId> {
        (0..5_i32)
            .map(|i| {
                let el = page.insert_into_body(&Fragment::new("div").class("timeline-item"));
                page.set_geometry(el, 100.0 + 300.0 * f64::from(i), 200.0);
                el
            })
            .collect()
    }

    fn visible(page: &HeadlessPage, items: &[NodeId]) -> Vec<bool> {
        items.iter().map(|el| page.has_class(el, "visible")).collect()
    }

    #[test]
    fn ratio_accounts_for_bottom_margin() {
        // Zone is [0, 640) for an 800px viewport with a 20% bottom cut.
        assert_eq!(intersection_ratio(0.0, 100.0, 800.0, 0.2), 1.0);
        assert_eq!(intersection_ratio(600.0, 100.0, 800.0, 0.2), 0.4);
        assert_eq!(intersection_ratio(700.0, 100.0, 800.0, 0.2), 0.0);
        assert_eq!(intersection_ratio(-50.0, 100.0, 800.0, 0.2), 0.5);
        assert_eq!(intersection_ratio(10.0, 0.0, 800.0, 0.2), 1.0);
    }

    #[test]
    fn trigger_zone_needs_threshold_share() {
        let options = RevealConfig::portfolio().options;
        // 10 of 500px inside the 640px zone.
        assert!(!in_trigger_zone(630.0, 500.0, 800.0, options));
        // 140 of 500px inside.
        assert!(in_trigger_zone(500.0, 500.0, 800.0, options));
        assert!(!in_trigger_zone(700.0, 0.0, 800.0, options));
    }

    #[test]
    fn fold_is_strictly_above() {
        assert!(top_within_fold(639.0, 800.0, 0.8));
        assert!(!top_within_fold(640.0, 800.0, 0.8));
    }

    #[test]
    fn reveal_is_monotonic() {
        let mut item = RevealableItem::new(1_u8);
        assert!(item.reveal());
        assert!(!item.reveal());
        assert!(item.is_visible());
    }

    #[test]
    fn capability_selects_strategy() {
        let timers = ManualTimers::new();
        let with = select_watcher(&HeadlessPage::new(), &timers, RevealConfig::portfolio());
        let without = select_watcher(
            &HeadlessPage::without_observer(),
            &timers,
            RevealConfig::portfolio(),
        );
        assert_eq!(with.strategy(), Strategy::Observer);
        assert_eq!(without.strategy(), Strategy::Polling);
    }

    #[test]
    fn observer_strategy_reveals_on_notification() {
        let page = HeadlessPage::new();
        let timers = ManualTimers::new();
        let items = timeline(&page);

        let watcher = reveal_page(&page, &timers, RevealConfig::portfolio())
            .unwrap()
            .expect("items present");
        assert_eq!(page.observer_count(), 1);
        // Initial check: tops at 100, 400 are above 640.
        assert_eq!(visible(&page, &items), [true, true, false, false, false]);

        page.scroll_to(600.0);
        // Tops now at -500, -200, 100, 400, 700.
        assert_eq!(visible(&page, &items), [true, true, true, true, false]);

        page.scroll_to(0.0);
        assert_eq!(
            visible(&page, &items),
            [true, true, true, true, false],
            "items never hide again"
        );
        assert_eq!(watcher.items().iter().filter(|i| i.is_visible()).count(), 4);
    }

    #[test]
    fn observer_setup_skips_tall_item_barely_on_screen() {
        let page = HeadlessPage::new();
        let timers = ManualTimers::new();
        let tall = page.insert_into_body(&Fragment::new("div").class("timeline-item"));
        page.set_geometry(tall, 630.0, 500.0);

        reveal_page(&page, &timers, RevealConfig::portfolio())
            .unwrap()
            .expect("items present");
        page.notify_intersections();
        assert!(
            !page.has_class(&tall, "visible"),
            "only 10px of 500px are inside the zone"
        );

        page.scroll_to(100.0);
        assert!(page.has_class(&tall, "visible"));
    }

    #[test]
    fn polling_strategy_waits_for_quiet_scroll() {
        let page = HeadlessPage::without_observer();
        let timers = ManualTimers::new();
        let items = timeline(&page);

        reveal_page(&page, &timers, RevealConfig::portfolio())
            .unwrap()
            .expect("items present");
        assert_eq!(visible(&page, &items), [true, true, false, false, false]);

        page.scroll_to(300.0);
        timers.advance(Duration(50));
        page.scroll_to(600.0);
        timers.advance(Duration(99));
        assert_eq!(
            visible(&page, &items),
            [true, true, false, false, false],
            "still inside the debounce window"
        );
        timers.advance(Duration(1));
        assert_eq!(visible(&page, &items), [true, true, true, true, false]);

        page.scroll_to(0.0);
        timers.advance(Duration(100));
        assert_eq!(visible(&page, &items), [true, true, true, true, false]);
    }

    #[test]
    fn polling_strategy_checks_on_load() {
        let page = HeadlessPage::without_observer();
        let timers = ManualTimers::new();
        let items = timeline(&page);
        reveal_page(&page, &timers, RevealConfig::portfolio()).unwrap();

        page.set_viewport_height(2_000.0);
        page.load();
        assert_eq!(visible(&page, &items), [true; 5]);
    }

    #[test]
    fn empty_page_is_a_no_op() {
        let page = HeadlessPage::new();
        let timers = ManualTimers::new();
        let watcher = reveal_page(&page, &timers, RevealConfig::portfolio()).unwrap();
        assert!(watcher.is_none());
        assert_eq!(page.observer_count(), 0);
    }
}
