// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Light/dark theme preference.
//!
//! [`ThemePreference`] reads and writes the persisted choice;
//! [`PreferenceToggle`] reflects it on the page (root `data-theme`
//! attribute, toggle icon, label, and `aria-pressed`) and flips it on click.

use alloc::boxed::Box;
use core::fmt;
use core::str::FromStr;

use crate::error::FolioError;
use crate::store::PreferenceStore;
use crate::ui::{EventKind, EventTarget, UiEvent, UiPort};

/// Color scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Light scheme; marked on the root element.
    Light,
    /// Dark scheme; the stylesheet default.
    #[default]
    Dark,
}

impl Theme {
    /// Returns the persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Returns the other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    const fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fas fa-sun",
            Self::Dark => "fas fa-moon",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown theme name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownTheme;

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown theme")
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(UnknownTheme),
        }
    }
}

/// Element names and storage key used by the theme toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Durable store key.
    pub store_key: &'static str,
    /// Id of the icon element.
    pub icon_id: &'static str,
    /// Id of the label element.
    pub label_id: &'static str,
    /// Class of the toggle button.
    pub button_class: &'static str,
    /// Root attribute set to `light` in the light theme.
    pub root_attribute: &'static str,
}

impl ThemeConfig {
    /// Names used by the portfolio page.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            store_key: "theme",
            icon_id: "theme-icon",
            label_id: "theme-text",
            button_class: "theme-toggle",
            root_attribute: "data-theme",
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// The persisted theme choice.
#[derive(Clone, Debug)]
pub struct ThemePreference<S> {
    store: S,
    key: &'static str,
}

impl<S: PreferenceStore> ThemePreference<S> {
    /// Wraps `store`, keeping the choice under `key`.
    pub fn new(store: S, key: &'static str) -> Self {
        Self { store, key }
    }

    /// Returns the persisted theme, or [`Theme::Dark`] when nothing usable is
    /// stored.
    pub fn load(&self) -> Theme {
        match self.store.get(self.key) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %value, "ignoring unknown stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                tracing::warn!(%err, "could not read theme preference");
                Theme::default()
            }
        }
    }

    /// Persists `theme`. Failures are logged.
    pub fn save(&self, theme: Theme) {
        if let Err(err) = self.store.set(self.key, theme.as_str()) {
            tracing::warn!(%err, "could not save theme preference");
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Applies and toggles the theme on the page.
pub struct PreferenceToggle<U, S> {
    ui: U,
    preference: ThemePreference<S>,
    config: ThemeConfig,
}

impl<U: UiPort, S: PreferenceStore> PreferenceToggle<U, S> {
    /// Creates a toggle backed by `store`.
    pub fn new(ui: &U, store: S, config: ThemeConfig) -> Self {
        Self {
            ui: ui.clone(),
            preference: ThemePreference::new(store, config.store_key),
            config,
        }
    }

    /// Applies the persisted theme and returns it.
    pub fn init(&self) -> Theme {
        let theme = self.preference.load();
        self.apply(theme);
        theme
    }

    /// Switches to the other theme and returns it.
    pub fn toggle(&self) -> Theme {
        let theme = self.preference.load().toggled();
        self.apply(theme);
        theme
    }

    /// Reflects `theme` on the page, then persists it.
    ///
    /// If the icon, label, or button is missing, logs a warning and changes
    /// nothing. If a page update fails, logs it and leaves the stored
    /// preference untouched. Returns `true` only when the theme was both
    /// reflected and persisted.
    pub fn apply(&self, theme: Theme) -> bool {
        let ui = &self.ui;
        let (Some(icon), Some(label), Some(button)) = (
            ui.element_by_id(self.config.icon_id),
            ui.element_by_id(self.config.label_id),
            ui.first_by_class(self.config.button_class),
        ) else {
            tracing::warn!("theme toggle elements not found");
            return false;
        };

        if let Err(err) = self.reflect(theme, &icon, &label, &button) {
            tracing::warn!(%err, %theme, "failed to apply theme");
            return false;
        }
        self.preference.save(theme);
        true
    }

    fn reflect(
        &self,
        theme: Theme,
        icon: &U::Element,
        label: &U::Element,
        button: &U::Element,
    ) -> Result<(), FolioError> {
        let ui = &self.ui;
        if let Some(root) = ui.root() {
            match theme {
                Theme::Light => ui.set_attribute(&root, self.config.root_attribute, "light")?,
                Theme::Dark => ui.remove_attribute(&root, self.config.root_attribute)?,
            }
        }
        ui.set_class_name(icon, theme.icon_class());
        ui.set_text(label, theme.label());
        let pressed = if theme == Theme::Light { "true" } else { "false" };
        ui.set_attribute(button, "aria-pressed", pressed)
    }

    /// Returns the persisted theme.
    pub fn current(&self) -> Theme {
        self.preference.load()
    }
}

impl<U: UiPort, S: PreferenceStore + Clone + 'static> PreferenceToggle<U, S> {
    /// Toggles the theme whenever the button is clicked.
    pub fn bind(&self) -> Result<(), FolioError> {
        let Some(button) = self.ui.first_by_class(self.config.button_class) else {
            tracing::warn!(class = self.config.button_class, "theme toggle button not found");
            return Ok(());
        };
        let toggle = self.clone();
        self.ui.on(
            EventTarget::Element(&button),
            EventKind::Click,
            Box::new(move |_: &UiEvent<U::Element>| {
                let theme = toggle.toggle();
                tracing::debug!(%theme, "theme toggled");
            }),
        )
    }
}

impl<U: Clone, S: Clone> Clone for PreferenceToggle<U, S> {
    fn clone(&self) -> Self {
        Self {
            ui: self.ui.clone(),
            preference: self.preference.clone(),
            config: self.config,
        }
    }
}

impl<U, S> fmt::Debug for PreferenceToggle<U, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceToggle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessPage, NodeId};
    use crate::store::MemoryStore;
    use crate::ui::Fragment;
    use alloc::string::String;

    struct Controls {
        icon: NodeId,
        label: NodeId,
        button: NodeId,
    }

    fn page_with_controls() -> (HeadlessPage, Controls) {
        let page = HeadlessPage::new();
        let button = page.insert_into_body(&Fragment::new("button").class("theme-toggle"));
        let icon = page.insert(button, &Fragment::new("i").attr("id", "theme-icon"));
        let label = page.insert(button, &Fragment::new("span").attr("id", "theme-text"));
        (page, Controls { icon, label, button })
    }

    fn root_theme(page: &HeadlessPage) -> Option<String> {
        let root = page.root().unwrap();
        page.attribute(&root, "data-theme")
    }

    #[test]
    fn parse_round_trips_and_rejects_unknown() {
        assert_eq!("light".parse(), Ok(Theme::Light));
        assert_eq!("dark".parse(), Ok(Theme::Dark));
        assert_eq!("Light".parse::<Theme>(), Err(UnknownTheme));
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn absent_or_unknown_preference_is_dark() {
        let pref = ThemePreference::new(MemoryStore::new(), "theme");
        assert_eq!(pref.load(), Theme::Dark);
        let pref = ThemePreference::new(MemoryStore::with_entry("theme", "sepia"), "theme");
        assert_eq!(pref.load(), Theme::Dark);
    }

    #[test]
    fn init_applies_stored_light_theme() {
        let (page, c) = page_with_controls();
        let store = MemoryStore::with_entry("theme", "light");
        let toggle = PreferenceToggle::new(&page, store, ThemeConfig::portfolio());

        assert_eq!(toggle.init(), Theme::Light);
        assert_eq!(root_theme(&page).as_deref(), Some("light"));
        assert_eq!(page.class_name(c.icon), "fas fa-sun");
        assert_eq!(page.text(&c.label), "Light");
        assert_eq!(page.attribute(&c.button, "aria-pressed").as_deref(), Some("true"));
    }

    #[test]
    fn toggle_twice_restores_preference() {
        let (page, c) = page_with_controls();
        let store = MemoryStore::new();
        let toggle = PreferenceToggle::new(&page, store.clone(), ThemeConfig::portfolio());
        toggle.init();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));

        assert_eq!(toggle.toggle(), Theme::Light);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        assert_eq!(toggle.toggle(), Theme::Dark);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(root_theme(&page), None);
        assert_eq!(page.class_name(c.icon), "fas fa-moon");
        assert_eq!(page.text(&c.label), "Dark");
        assert_eq!(page.attribute(&c.button, "aria-pressed").as_deref(), Some("false"));
    }

    #[test]
    fn missing_controls_change_nothing() {
        let page = HeadlessPage::new();
        let store = MemoryStore::new();
        let toggle = PreferenceToggle::new(&page, store.clone(), ThemeConfig::portfolio());
        assert!(!toggle.apply(Theme::Light));
        assert!(store.is_empty(), "nothing persisted");
        assert_eq!(root_theme(&page), None);
    }

    #[test]
    fn failed_page_update_keeps_stored_theme() {
        let (page, _) = page_with_controls();
        let store = MemoryStore::with_entry("theme", "dark");
        let toggle = PreferenceToggle::new(&page, store.clone(), ThemeConfig::portfolio());
        page.reject_attribute("aria-pressed");

        assert!(!toggle.apply(Theme::Light));
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(toggle.toggle(), Theme::Light, "still toggles from the stored value");
        assert_eq!(toggle.current(), Theme::Dark);
    }

    #[test]
    fn button_click_toggles() {
        let (page, c) = page_with_controls();
        let store = MemoryStore::new();
        let toggle = PreferenceToggle::new(&page, store.clone(), ThemeConfig::portfolio());
        toggle.init();
        toggle.bind().unwrap();

        // Clicking the icon bubbles up to the button.
        page.click(c.icon);
        assert_eq!(toggle.current(), Theme::Light);
        page.click(c.button);
        assert_eq!(toggle.current(), Theme::Dark);
    }
}
