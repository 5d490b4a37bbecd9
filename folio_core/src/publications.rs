// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Publication list and category filter.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::content::PublicationRecord;
use crate::error::FolioError;
use crate::ui::{EventKind, EventTarget, Fragment, UiEvent, UiPort, require_id};

/// Category that matches every publication.
pub const ALL_CATEGORIES: &str = "all";

/// Element names used by the publication list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    /// Id of the list container.
    pub container_id: &'static str,
    /// Class of each rendered publication.
    pub item_class: &'static str,
    /// Class of the filter buttons.
    pub button_class: &'static str,
    /// Class marking the selected button.
    pub active_class: &'static str,
    /// Class hiding a filtered-out publication.
    pub hidden_class: &'static str,
}

impl FilterConfig {
    /// Names used by the portfolio page.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            container_id: "publications-grid",
            item_class: "pub-item",
            button_class: "filter-btn",
            active_class: "active",
            hidden_class: "hidden",
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Builds the element tree for one publication.
#[must_use]
pub fn render_publication(record: &PublicationRecord, item_class: &str) -> Fragment {
    let tags = record.tags.iter().fold(Fragment::new("div").class("pub-tags"), |div, tag| {
        div.child(Fragment::new("span").class("pub-tag").text(tag.as_str()))
    });
    let link = Fragment::new("a")
        .class("pub-link")
        .attr("href", record.url.as_str())
        .attr("target", "_blank")
        .attr("rel", "noopener noreferrer")
        .child(
            Fragment::new("i")
                .class("fas")
                .class("fa-external-link-alt")
                .attr("aria-hidden", "true"),
        )
        .text(" Read Paper");

    Fragment::new("article")
        .class(item_class)
        .attr("data-category", record.category.as_str())
        .child(Fragment::new("h3").text(record.title.as_str()))
        .child(Fragment::new("p").class("pub-meta").text(record.meta_line()))
        .child(tags)
        .child(Fragment::new("p").attr("style", "margin-top: 0.8rem;").child(link))
}

/// Renders publications and filters them by category.
///
/// Clones share the selected category.
pub struct CategoryFilter<U> {
    ui: U,
    config: FilterConfig,
    current: Rc<RefCell<String>>,
}

impl<U: UiPort> CategoryFilter<U> {
    /// Creates a filter showing every category.
    pub fn new(ui: &U, config: FilterConfig) -> Self {
        Self {
            ui: ui.clone(),
            config,
            current: Rc::new(RefCell::new(ALL_CATEGORIES.to_string())),
        }
    }

    /// Returns the selected category.
    pub fn current_category(&self) -> String {
        self.current.borrow().clone()
    }

    /// Replaces the container contents with one item per record, in order.
    ///
    /// Returns how many items were rendered. A missing container or missing
    /// or empty data is logged and renders nothing.
    pub fn render(&self, records: Option<&[PublicationRecord]>) -> Result<usize, FolioError> {
        let Ok(container) = require_id(&self.ui, self.config.container_id) else {
            return Ok(0);
        };
        let Some(records) = records.filter(|r| !r.is_empty()) else {
            tracing::warn!(err = %FolioError::DataAbsent("publication"), "nothing to render");
            return Ok(0);
        };
        let fragments: Vec<Fragment> = records
            .iter()
            .map(|r| render_publication(r, self.config.item_class))
            .collect();
        let items = self.ui.replace_children(&container, &fragments)?;
        tracing::debug!(count = items.len(), "publications rendered");
        Ok(items.len())
    }

    /// Shows only publications in `category` (every one for `"all"`) and
    /// marks the matching filter button active.
    pub fn select(&self, category: &str) -> Result<(), FolioError> {
        let ui = &self.ui;
        *self.current.borrow_mut() = category.to_string();

        for button in ui.elements_by_class(self.config.button_class) {
            if ui.attribute(&button, "data-category").as_deref() == Some(category) {
                ui.add_class(&button, self.config.active_class)?;
            } else {
                ui.remove_class(&button, self.config.active_class)?;
            }
        }
        for item in ui.elements_by_class(self.config.item_class) {
            let shown = category == ALL_CATEGORIES
                || ui.attribute(&item, "data-category").as_deref() == Some(category);
            if shown {
                ui.remove_class(&item, self.config.hidden_class)?;
            } else {
                ui.add_class(&item, self.config.hidden_class)?;
            }
        }
        Ok(())
    }

    /// Selects a button's category whenever it is clicked. Returns how many
    /// buttons were wired.
    pub fn bind_buttons(&self) -> Result<usize, FolioError> {
        let mut bound = 0;
        for button in self.ui.elements_by_class(self.config.button_class) {
            let Some(category) = self.ui.attribute(&button, "data-category") else {
                tracing::warn!(?button, "filter button without a category");
                continue;
            };
            let filter = self.clone();
            self.ui.on(
                EventTarget::Element(&button),
                EventKind::Click,
                Box::new(move |_: &UiEvent<U::Element>| {
                    if let Err(err) = filter.select(&category) {
                        tracing::error!(%err, category = %category, "filter failed");
                    }
                }),
            )?;
            bound += 1;
        }
        Ok(bound)
    }
}

impl<U: Clone> Clone for CategoryFilter<U> {
    fn clone(&self) -> Self {
        Self {
            ui: self.ui.clone(),
            config: self.config,
            current: Rc::clone(&self.current),
        }
    }
}

impl<U> fmt::Debug for CategoryFilter<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryFilter")
            .field("config", &self.config)
            .field("current", &self.current.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessPage, NodeId};
    use alloc::vec;

    fn record(title: &str, category: &str, tags: &[&str]) -> PublicationRecord {
        PublicationRecord {
            title: title.to_string(),
            venue: "Neurology".to_string(),
            year: 2024,
            category: category.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            url: "https://doi.org/10.1212/WNL.0000000000212109".to_string(),
        }
    }

    fn records() -> Vec<PublicationRecord> {
        vec![
            record("A", "medical-imaging", &["CT"]),
            record("B", "neuroscience", &["iPSC", "Network Topology"]),
            record("C", "clinical", &[]),
            record("D", "neuroscience", &[]),
        ]
    }

    fn page() -> (HeadlessPage, NodeId, Vec<NodeId>) {
        let page = HeadlessPage::new();
        let buttons = ["all", "medical-imaging", "neuroscience", "clinical"]
            .iter()
            .map(|c| {
                page.insert_into_body(
                    &Fragment::new("button").class("filter-btn").attr("data-category", *c),
                )
            })
            .collect();
        let grid = page.insert_into_body(&Fragment::new("div").attr("id", "publications-grid"));
        (page, grid, buttons)
    }

    fn hidden_titles(page: &HeadlessPage) -> Vec<String> {
        page.elements_by_class("pub-item")
            .iter()
            .filter(|el| page.has_class(el, "hidden"))
            .map(|el| page.text(&page.children(*el)[0]))
            .collect()
    }

    #[test]
    fn publication_fragment_shape() {
        let f = render_publication(&record("A", "clinical", &["x", "y"]), "pub-item");
        assert_eq!(f.tag(), "article");
        assert_eq!(f.attribute("data-category"), Some("clinical"));
        assert_eq!(f.text_content(), "ANeurology | 2024xy Read Paper");
        let link = alloc::format!("{f}");
        assert!(link.contains(
            "<a class=\"pub-link\" href=\"https://doi.org/10.1212/WNL.0000000000212109\" \
             target=\"_blank\" rel=\"noopener noreferrer\">"
        ));
        assert!(link.contains("<i class=\"fas fa-external-link-alt\" aria-hidden=\"true\"></i>"));
    }

    #[test]
    fn render_replaces_contents_in_order() {
        let (page, grid, _) = page();
        page.insert(grid, &Fragment::new("p").text("Loading"));
        let filter = CategoryFilter::new(&page, FilterConfig::portfolio());

        assert_eq!(filter.render(Some(records().as_slice())), Ok(4));
        let items = page.children(grid);
        assert_eq!(items.len(), 4);
        let titles: Vec<String> = items.iter().map(|el| page.text(&page.children(*el)[0])).collect();
        assert_eq!(titles, ["A", "B", "C", "D"]);
    }

    #[test]
    fn render_without_data_or_container_is_a_no_op() {
        let (page, grid, _) = page();
        let filter = CategoryFilter::new(&page, FilterConfig::portfolio());
        assert_eq!(filter.render(None), Ok(0));
        assert_eq!(filter.render(Some(&[][..])), Ok(0));
        assert!(page.children(grid).is_empty());

        let bare = HeadlessPage::new();
        let filter = CategoryFilter::new(&bare, FilterConfig::portfolio());
        assert_eq!(filter.render(Some(records().as_slice())), Ok(0));
    }

    #[test]
    fn select_shows_exactly_matching_items() {
        let (page, _, buttons) = page();
        let filter = CategoryFilter::new(&page, FilterConfig::portfolio());
        filter.render(Some(records().as_slice())).unwrap();

        filter.select("neuroscience").unwrap();
        assert_eq!(hidden_titles(&page), ["A", "C"]);
        assert_eq!(filter.current_category(), "neuroscience");
        let active: Vec<bool> = buttons.iter().map(|b| page.has_class(b, "active")).collect();
        assert_eq!(active, [false, false, true, false]);

        filter.select("all").unwrap();
        assert!(hidden_titles(&page).is_empty());
        assert!(page.has_class(&buttons[0], "active"));
        assert!(!page.has_class(&buttons[2], "active"));
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let (page, _, buttons) = page();
        let filter = CategoryFilter::new(&page, FilterConfig::portfolio());
        filter.render(Some(records().as_slice())).unwrap();
        filter.select("Neuroscience").unwrap();
        assert_eq!(hidden_titles(&page), ["A", "B", "C", "D"]);
        assert!(buttons.iter().all(|b| !page.has_class(b, "active")));
    }

    #[test]
    fn clicking_a_button_filters() {
        let (page, _, buttons) = page();
        let filter = CategoryFilter::new(&page, FilterConfig::portfolio());
        filter.render(Some(records().as_slice())).unwrap();
        assert_eq!(filter.bind_buttons(), Ok(4));

        page.click(buttons[3]);
        assert_eq!(hidden_titles(&page), ["A", "B", "D"]);
        page.click(buttons[0]);
        assert!(hidden_titles(&page).is_empty());
        assert_eq!(filter.current_category(), "all");
    }
}
