// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page wiring and the smaller page behaviors.
//!
//! [`Page::init`] starts every controller in a fixed order. A controller that
//! fails is logged and skipped; the rest still start.

use alloc::boxed::Box;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::fmt;

use rand::Rng;

use crate::content::Portfolio;
use crate::cycler::{self, CycleHandle, CyclerConfig};
use crate::error::FolioError;
use crate::particles::{ParticleConfig, ParticleField};
use crate::publications::{CategoryFilter, FilterConfig};
use crate::reveal::{self, RevealConfig, VisibilityWatcher};
use crate::store::PreferenceStore;
use crate::theme::{PreferenceToggle, ThemeConfig};
use crate::time::Duration;
use crate::timer::Timers;
use crate::ui::{EventKind, EventTarget, Fragment, UiEvent, UiPort, require_id};

/// Element names for the skills grid, footer year, and info tooltips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageConfig {
    /// Id of the skills container.
    pub skills_id: &'static str,
    /// Class of each rendered skill.
    pub skill_class: &'static str,
    /// Id of the element showing the current year.
    pub year_id: &'static str,
    /// Class of the tooltip buttons.
    pub info_button_class: &'static str,
    /// Class of the tooltip boxes (each the next sibling of its button).
    pub info_box_class: &'static str,
    /// How long after losing focus a tooltip closes, unless hovered.
    pub blur_delay: Duration,
}

impl PageConfig {
    /// Names used by the portfolio page.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            skills_id: "skills-grid",
            skill_class: "skill-tag",
            year_id: "current-year",
            info_button_class: "info-btn",
            info_box_class: "info-box",
            blur_delay: Duration(100),
        }
    }
}

/// Configuration for every controller on the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FolioConfig {
    /// Theme toggle.
    pub theme: ThemeConfig,
    /// Hero text cycler.
    pub cycler: CyclerConfig,
    /// Hero particles.
    pub particles: ParticleConfig,
    /// Timeline reveal.
    pub reveal: RevealConfig,
    /// Publication list.
    pub filter: FilterConfig,
    /// Skills, year, and tooltips.
    pub page: PageConfig,
}

impl FolioConfig {
    /// Settings used by the portfolio page.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            theme: ThemeConfig::portfolio(),
            cycler: CyclerConfig::portfolio(),
            particles: ParticleConfig::portfolio(),
            reveal: RevealConfig::portfolio(),
            filter: FilterConfig::portfolio(),
            page: PageConfig::portfolio(),
        }
    }
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Replaces the skills container contents with one tag per skill.
///
/// Returns how many were rendered; a missing container or missing or empty
/// data is logged and renders nothing.
pub fn render_skills<U: UiPort>(
    ui: &U,
    skills: Option<&[String]>,
    config: &PageConfig,
) -> Result<usize, FolioError> {
    let Ok(container) = require_id(ui, config.skills_id) else {
        return Ok(0);
    };
    let Some(skills) = skills.filter(|s| !s.is_empty()) else {
        tracing::warn!(err = %FolioError::DataAbsent("skills"), "nothing to render");
        return Ok(0);
    };
    let tags: Vec<Fragment> = skills
        .iter()
        .map(|s| Fragment::new("div").class(config.skill_class).text(s.as_str()))
        .collect();
    Ok(ui.replace_children(&container, &tags)?.len())
}

/// Writes `year` into the footer. Returns `false` if the element is absent.
pub fn update_year<U: UiPort>(ui: &U, year: u32, config: &PageConfig) -> bool {
    match ui.element_by_id(config.year_id) {
        Some(el) => {
            ui.set_text(&el, &year.to_string());
            true
        }
        None => false,
    }
}

/// Accessible info tooltips.
///
/// Each `info-btn` directly followed by an `info-box` sibling becomes a
/// disclosure: its box is shown with `display: block`, hidden with
/// `display: none`, and `aria-expanded` on the button tracks the state.
pub struct InfoTooltips<U, T> {
    ui: U,
    timers: T,
    config: PageConfig,
}

impl<U: UiPort, T: Timers> InfoTooltips<U, T> {
    /// Creates an unbound tooltip controller.
    pub fn new(ui: &U, timers: &T, config: PageConfig) -> Self {
        Self {
            ui: ui.clone(),
            timers: timers.clone(),
            config,
        }
    }

    /// Wires every button/box pair and the document-level close handlers.
    /// Returns how many pairs were wired.
    pub fn bind(&self) -> Result<usize, FolioError> {
        let mut pairs = 0;
        for button in self.ui.elements_by_class(self.config.info_button_class) {
            let Some(tip) = self
                .ui
                .next_element_sibling(&button)
                .filter(|s| self.ui.has_class(s, self.config.info_box_class))
            else {
                continue;
            };
            self.bind_pair(&button, &tip)?;
            pairs += 1;
        }
        self.bind_document()?;
        Ok(pairs)
    }

    fn bind_pair(&self, button: &U::Element, tip: &U::Element) -> Result<(), FolioError> {
        let (ui, b, t) = (self.ui.clone(), button.clone(), tip.clone());
        self.ui.on(
            EventTarget::Element(button),
            EventKind::Click,
            Box::new(move |e: &UiEvent<U::Element>| {
                e.prevent_default();
                toggle(&ui, &b, &t);
            }),
        )?;

        let (ui, b, t) = (self.ui.clone(), button.clone(), tip.clone());
        self.ui.on(
            EventTarget::Element(button),
            EventKind::KeyDown,
            Box::new(move |e: &UiEvent<U::Element>| {
                if matches!(e.key.as_deref(), Some("Enter" | " ")) {
                    e.prevent_default();
                    toggle(&ui, &b, &t);
                }
            }),
        )?;

        let (ui, b, t) = (self.ui.clone(), button.clone(), tip.clone());
        self.ui.on(
            EventTarget::Element(button),
            EventKind::MouseEnter,
            Box::new(move |_: &UiEvent<U::Element>| set_shown(&ui, &b, &t, true)),
        )?;

        let (ui, b, t) = (self.ui.clone(), button.clone(), tip.clone());
        self.ui.on(
            EventTarget::Element(button),
            EventKind::MouseLeave,
            Box::new(move |_: &UiEvent<U::Element>| set_shown(&ui, &b, &t, false)),
        )?;

        let (ui, timers, b, t) = (
            self.ui.clone(),
            self.timers.clone(),
            button.clone(),
            tip.clone(),
        );
        let delay = self.config.blur_delay;
        self.ui.on(
            EventTarget::Element(button),
            EventKind::Blur,
            Box::new(move |_: &UiEvent<U::Element>| {
                let (ui, b, t) = (ui.clone(), b.clone(), t.clone());
                timers.set_timeout(
                    delay,
                    Box::new(move || {
                        if !ui.is_hovered(&t) {
                            set_shown(&ui, &b, &t, false);
                        }
                    }),
                );
            }),
        )
    }

    fn bind_document(&self) -> Result<(), FolioError> {
        let (ui, config) = (self.ui.clone(), self.config);
        self.ui.on(
            EventTarget::Document,
            EventKind::Click,
            Box::new(move |e: &UiEvent<U::Element>| {
                let inside = e.target.as_ref().is_some_and(|t| {
                    ui.closest(t, config.info_button_class).is_some()
                        || ui.closest(t, config.info_box_class).is_some()
                });
                if !inside {
                    hide_all(&ui, &config);
                }
            }),
        )?;

        let (ui, config) = (self.ui.clone(), self.config);
        self.ui.on(
            EventTarget::Document,
            EventKind::KeyDown,
            Box::new(move |e: &UiEvent<U::Element>| {
                if e.key.as_deref() == Some("Escape") {
                    hide_all(&ui, &config);
                }
            }),
        )
    }
}

impl<U, T> fmt::Debug for InfoTooltips<U, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfoTooltips")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn set_shown<U: UiPort>(ui: &U, button: &U::Element, tip: &U::Element, shown: bool) {
    let (display, expanded) = if shown { ("block", "true") } else { ("none", "false") };
    let result = ui
        .set_style(tip, "display", display)
        .and_then(|()| ui.set_attribute(button, "aria-expanded", expanded));
    if let Err(err) = result {
        tracing::warn!(%err, "failed to update tooltip");
    }
}

fn toggle<U: UiPort>(ui: &U, button: &U::Element, tip: &U::Element) {
    let expanded = ui.attribute(button, "aria-expanded").as_deref() == Some("true");
    set_shown(ui, button, tip, !expanded);
}

fn hide_all<U: UiPort>(ui: &U, config: &PageConfig) {
    for tip in ui.elements_by_class(config.info_box_class) {
        if let Err(err) = ui.set_style(&tip, "display", "none") {
            tracing::warn!(%err, "failed to hide tooltip");
        }
    }
    for button in ui.elements_by_class(config.info_button_class) {
        if let Err(err) = ui.set_attribute(&button, "aria-expanded", "false") {
            tracing::warn!(%err, "failed to reset tooltip button");
        }
    }
}

/// Everything started by [`Page::init`].
pub struct Page<U: UiPort, T: Timers, S> {
    /// Theme toggle, bound to its button.
    pub theme: PreferenceToggle<U, S>,
    /// Running hero text cycler, if its element exists.
    pub cycler: Option<CycleHandle<T>>,
    /// Timeline watcher, if the page has timeline items.
    pub watcher: Option<Box<dyn VisibilityWatcher<U::Element>>>,
    /// Publication filter, bound to its buttons.
    pub filter: CategoryFilter<U>,
    /// Particles added to the hero.
    pub particles: usize,
    /// Tooltip pairs wired.
    pub tooltips: usize,
}

impl<U, T, S> Page<U, T, S>
where
    U: UiPort,
    T: Timers,
    S: PreferenceStore + Clone + 'static,
{
    /// Starts every controller.
    ///
    /// Order: theme, skills, year, tooltips, text cycler, particles, timeline
    /// reveal, publications and their filter buttons. `content` is the
    /// externally supplied data; `None` leaves the data-driven sections
    /// untouched. `year` fills the footer.
    pub fn init<R: Rng + ?Sized>(
        ui: &U,
        timers: &T,
        store: S,
        content: Option<&Portfolio>,
        rng: &mut R,
        year: u32,
        config: &FolioConfig,
    ) -> Self {
        let theme = PreferenceToggle::new(ui, store, config.theme);
        theme.init();
        logged("theme", theme.bind());

        logged(
            "skills",
            render_skills(ui, content.map(|c| c.skills.as_slice()), &config.page),
        );
        update_year(ui, year, &config.page);
        let tooltips = logged("tooltips", InfoTooltips::new(ui, timers, config.page).bind())
            .unwrap_or_default();

        let cycler = cycler::start(ui, timers, config.cycler);
        let particles = logged(
            "particles",
            ParticleField::new(config.particles).and_then(|f| f.populate_page(ui, rng)),
        )
        .unwrap_or_default();
        let watcher = logged("reveal", reveal::reveal_page(ui, timers, config.reveal)).flatten();

        let filter = CategoryFilter::new(ui, config.filter);
        logged(
            "publications",
            filter.render(content.map(|c| c.publications.as_slice())),
        );
        logged("filters", filter.bind_buttons());

        tracing::info!("page initialized");
        Self {
            theme,
            cycler,
            watcher,
            filter,
            particles,
            tooltips,
        }
    }
}

impl<U: UiPort, T: Timers, S> fmt::Debug for Page<U, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("theme", &self.theme)
            .field("cycler", &self.cycler)
            .field("watcher", &self.watcher.as_ref().map(|w| w.strategy()))
            .field("filter", &self.filter)
            .field("particles", &self.particles)
            .field("tooltips", &self.tooltips)
            .finish()
    }
}

fn logged<V>(step: &'static str, result: Result<V, FolioError>) -> Option<V> {
    result
        .inspect_err(|err| tracing::error!(step, %err, "initialization step failed"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PublicationRecord;
    use crate::headless::{HeadlessPage, ManualTimers, NodeId};
    use crate::store::MemoryStore;
    use crate::theme::Theme;
    use alloc::vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn tooltip_pair(page: &HeadlessPage) -> (NodeId, NodeId) {
        let wrap = page.insert_into_body(&Fragment::new("div"));
        let button = page.insert(
            wrap,
            &Fragment::new("button")
                .class("info-btn")
                .attr("aria-expanded", "false")
                .child(Fragment::new("i").class("fas")),
        );
        let tip = page.insert(wrap, &Fragment::new("div").class("info-box").text("Details"));
        (button, tip)
    }

    fn bound_tooltips() -> (HeadlessPage, ManualTimers, NodeId, NodeId) {
        let page = HeadlessPage::new();
        let timers = ManualTimers::new();
        let (button, tip) = tooltip_pair(&page);
        let pairs = InfoTooltips::new(&page, &timers, PageConfig::portfolio())
            .bind()
            .unwrap();
        assert_eq!(pairs, 1);
        (page, timers, button, tip)
    }

    fn expanded(page: &HeadlessPage, button: NodeId) -> Option<String> {
        page.attribute(&button, "aria-expanded")
    }

    #[test]
    fn skills_replace_container_contents() {
        let page = HeadlessPage::new();
        let grid = page.insert_into_body(&Fragment::new("div").attr("id", "skills-grid"));
        page.insert(grid, &Fragment::new("p").text("placeholder"));
        let skills = vec!["Python".to_string(), "R".to_string()];

        assert_eq!(
            render_skills(&page, Some(&skills[..]), &PageConfig::portfolio()),
            Ok(2)
        );
        let children = page.children(grid);
        assert_eq!(children.len(), 2);
        assert_eq!(page.class_name(children[0]), "skill-tag");
        assert_eq!(page.text(&children[1]), "R");
    }

    #[test]
    fn skills_without_data_is_a_no_op() {
        let page = HeadlessPage::new();
        let grid = page.insert_into_body(&Fragment::new("div").attr("id", "skills-grid"));
        assert_eq!(render_skills(&page, None, &PageConfig::portfolio()), Ok(0));
        assert!(page.children(grid).is_empty());
    }

    #[test]
    fn year_is_written_when_present() {
        let page = HeadlessPage::new();
        assert!(!update_year(&page, 2026, &PageConfig::portfolio()));
        let el = page.insert_into_body(&Fragment::new("span").attr("id", "current-year"));
        assert!(update_year(&page, 2026, &PageConfig::portfolio()));
        assert_eq!(page.text(&el), "2026");
    }

    #[test]
    fn click_toggles_tooltip() {
        let (page, _, button, tip) = bound_tooltips();
        let event = page.click(button);
        assert!(event.default_prevented());
        assert_eq!(page.style(tip, "display").as_deref(), Some("block"));
        assert_eq!(expanded(&page, button).as_deref(), Some("true"));

        // A click on the icon inside the button bubbles to it.
        let icon = page.children(button)[0];
        page.click(icon);
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));
        assert_eq!(expanded(&page, button).as_deref(), Some("false"));
    }

    #[test]
    fn enter_and_space_toggle_other_keys_do_not() {
        let (page, _, button, tip) = bound_tooltips();
        assert!(page.key_down(button, "Enter").default_prevented());
        assert_eq!(page.style(tip, "display").as_deref(), Some("block"));
        assert!(page.key_down(button, " ").default_prevented());
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));
        assert!(!page.key_down(button, "a").default_prevented());
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));
    }

    #[test]
    fn hover_shows_and_hides() {
        let (page, _, button, tip) = bound_tooltips();
        page.fire(button, UiEvent::new(EventKind::MouseEnter));
        assert_eq!(page.style(tip, "display").as_deref(), Some("block"));
        page.fire(button, UiEvent::new(EventKind::MouseLeave));
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));
    }

    #[test]
    fn blur_hides_after_delay_unless_box_hovered() {
        let (page, timers, button, tip) = bound_tooltips();
        page.click(button);
        page.set_hovered(tip, true);
        page.fire(button, UiEvent::new(EventKind::Blur));
        timers.advance(Duration(100));
        assert_eq!(page.style(tip, "display").as_deref(), Some("block"));

        page.set_hovered(tip, false);
        page.fire(button, UiEvent::new(EventKind::Blur));
        timers.advance(Duration(99));
        assert_eq!(page.style(tip, "display").as_deref(), Some("block"));
        timers.advance(Duration(1));
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));
        assert_eq!(expanded(&page, button).as_deref(), Some("false"));
    }

    #[test]
    fn escape_and_outside_click_close_everything() {
        let (page, _, button, tip) = bound_tooltips();
        let outside = page.insert_into_body(&Fragment::new("p"));

        page.click(button);
        page.click(tip);
        assert_eq!(
            page.style(tip, "display").as_deref(),
            Some("block"),
            "clicks inside the box keep it open"
        );
        page.click(outside);
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));

        page.click(button);
        page.key_down(outside, "Escape");
        assert_eq!(page.style(tip, "display").as_deref(), Some("none"));
        assert_eq!(expanded(&page, button).as_deref(), Some("false"));
    }

    #[test]
    fn buttons_without_a_box_are_skipped() {
        let page = HeadlessPage::new();
        let timers = ManualTimers::new();
        page.insert_into_body(&Fragment::new("button").class("info-btn"));
        page.insert_into_body(&Fragment::new("p"));
        let pairs = InfoTooltips::new(&page, &timers, PageConfig::portfolio())
            .bind()
            .unwrap();
        assert_eq!(pairs, 0);
    }

    fn full_page() -> HeadlessPage {
        let page = HeadlessPage::new();
        let toggle = page.insert_into_body(&Fragment::new("button").class("theme-toggle"));
        page.insert(toggle, &Fragment::new("i").attr("id", "theme-icon"));
        page.insert(toggle, &Fragment::new("span").attr("id", "theme-text"));
        page.insert_into_body(&Fragment::new("span").attr("id", "typed-text"));
        page.insert_into_body(&Fragment::new("div").attr("id", "particles"));
        page.insert_into_body(&Fragment::new("div").attr("id", "skills-grid"));
        page.insert_into_body(&Fragment::new("span").attr("id", "current-year"));
        for category in ["all", "clinical"] {
            page.insert_into_body(
                &Fragment::new("button")
                    .class("filter-btn")
                    .attr("data-category", category),
            );
        }
        page.insert_into_body(&Fragment::new("div").attr("id", "publications-grid"));
        let item = page.insert_into_body(&Fragment::new("div").class("timeline-item"));
        page.set_geometry(item, 100.0, 200.0);
        page
    }

    fn portfolio() -> Portfolio {
        Portfolio {
            publications: vec![PublicationRecord {
                title: "Bayesian Network".to_string(),
                venue: "Journal of Trauma and Acute Care Surgery".to_string(),
                year: 2023,
                category: "clinical".to_string(),
                tags: vec!["Clinical".to_string()],
                url: "https://doi.org/10.1097/TA.0000000000003935".to_string(),
            }],
            skills: vec!["Python".to_string()],
        }
    }

    #[test]
    fn init_starts_every_controller() {
        let page = full_page();
        let timers = ManualTimers::new();
        let store = MemoryStore::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let content = portfolio();

        let started = Page::init(
            &page,
            &timers,
            store.clone(),
            Some(&content),
            &mut rng,
            2026,
            &FolioConfig::portfolio(),
        );

        assert_eq!(started.theme.current(), Theme::Dark);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert!(started.cycler.as_ref().is_some_and(CycleHandle::is_running));
        assert_eq!(started.particles, 15);
        assert_eq!(started.watcher.as_ref().map(|w| w.items().len()), Some(1));
        assert_eq!(page.elements_by_class("pub-item").len(), 1);
        assert_eq!(page.elements_by_class("skill-tag").len(), 1);
        let year = page.element_by_id("current-year").unwrap();
        assert_eq!(page.text(&year), "2026");

        let clinical = page.elements_by_class("filter-btn")[1];
        page.click(clinical);
        assert_eq!(started.filter.current_category(), "clinical");

        timers.advance(Duration(500));
        let typed = page.element_by_id("typed-text").unwrap();
        assert_eq!(page.text(&typed), "A");
    }

    #[test]
    fn init_on_an_empty_page_does_not_fail() {
        let page = HeadlessPage::new();
        let timers = ManualTimers::new();
        let store = MemoryStore::new();
        let mut rng = SmallRng::seed_from_u64(0);

        let started = Page::init(
            &page,
            &timers,
            store.clone(),
            None,
            &mut rng,
            2026,
            &FolioConfig::portfolio(),
        );
        assert!(started.cycler.is_none());
        assert!(started.watcher.is_none());
        assert_eq!(started.particles, 0);
        assert_eq!(started.tooltips, 0);
        assert!(store.is_empty(), "theme controls missing, nothing persisted");
        assert_eq!(timers.pending(), 0);
    }
}
