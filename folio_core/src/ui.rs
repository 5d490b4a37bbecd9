// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for document access.
//!
//! Controllers never reach for a global document. Everything they read or
//! mutate goes through a [`UiPort`], which the web backend implements on top
//! of the DOM and [`headless`](crate::headless) implements in memory.
//!
//! Renderable content is described by [`Fragment`] trees. A port turns a
//! fragment into real nodes (element and text nodes), so strings from data
//! records are never parsed as markup.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use crate::error::FolioError;

/// A document event the controllers listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer or keyboard activation.
    Click,
    /// A key was pressed.
    KeyDown,
    /// The pointer entered an element.
    MouseEnter,
    /// The pointer left an element.
    MouseLeave,
    /// An element lost focus.
    Blur,
    /// The window scrolled.
    Scroll,
    /// The window finished loading.
    Load,
}

impl EventKind {
    /// Returns the DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Blur => "blur",
            Self::Scroll => "scroll",
            Self::Load => "load",
        }
    }
}

/// Where an event listener is attached.
#[derive(Debug)]
pub enum EventTarget<'a, E> {
    /// A specific element.
    Element(&'a E),
    /// The document (receives bubbled clicks and key presses).
    Document,
    /// The window (receives scroll and load).
    Window,
}

/// An event delivered to a [`Handler`].
#[derive(Debug)]
pub struct UiEvent<E> {
    /// Which event fired.
    pub kind: EventKind,
    /// The key value for keyboard events (`"Enter"`, `" "`, `"Escape"`, ...).
    pub key: Option<String>,
    /// The element the event originated from, when it has one.
    pub target: Option<E>,
    default_prevented: Cell<bool>,
}

impl<E> UiEvent<E> {
    /// Creates an event of the given kind with no key and no target.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            key: None,
            target: None,
            default_prevented: Cell::new(false),
        }
    }

    /// Sets the key value.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the originating element.
    #[must_use]
    pub fn with_target(mut self, target: E) -> Self {
        self.target = Some(target);
        self
    }

    /// Asks the host to skip the event's default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Returns `true` if a handler called [`prevent_default`](Self::prevent_default).
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// An event listener.
pub type Handler<E> = Box<dyn FnMut(&UiEvent<E>)>;

/// Trigger zone for the host's visibility-detection facility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element that must be inside the zone (0.0–1.0).
    pub threshold: f64,
    /// Fraction of the viewport height cut from the bottom of the zone.
    pub bottom_margin: f64,
}

impl ObserverOptions {
    /// Formats the zone as a CSS root margin, e.g. `0px 0px -20% 0px`.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!("0px 0px -{}% 0px", self.bottom_margin * 100.0)
    }
}

/// One entry of an intersection notification batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersection<E> {
    /// The observed element.
    pub target: E,
    /// Whether the element currently meets the threshold.
    pub is_intersecting: bool,
}

/// Receives batches of intersection entries.
pub type IntersectionCallback<E> = Box<dyn FnMut(&[Intersection<E>])>;

/// A child of a [`Fragment`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Fragment),
    /// A text node.
    Text(String),
}

/// A renderable element tree.
///
/// ```
/// use folio_core::ui::Fragment;
///
/// let tag = Fragment::new("span").class("pub-tag").text("CNN");
/// assert_eq!(tag.text_content(), "CNN");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Fragment {
    /// Creates an empty element with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a text node.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Returns the tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the classes in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns the attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the value of the named attribute, if set.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the child nodes.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Concatenates every descendant text node, in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Element(f) => out.push_str(&f.text_content()),
                Node::Text(t) => out.push_str(t),
            }
        }
        out
    }

    /// Returns the class list joined by spaces, as in a `class` attribute.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", self.class_name())?;
        }
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                Node::Element(c) => write!(f, "{c}")?,
                Node::Text(t) => f.write_str(t)?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

/// Document access used by every controller.
///
/// Implementations are cheap handles (`Clone`) onto one shared document, so a
/// controller can capture a copy inside an event handler. Lookups that find
/// nothing return `None` or an empty list; controllers treat that as the
/// missing-target case and log a warning rather than failing.
pub trait UiPort: Clone + 'static {
    /// Handle to a document element.
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    /// Looks up an element by id.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Returns every element carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Element>;

    /// Returns the first element carrying `class`.
    fn first_by_class(&self, class: &str) -> Option<Self::Element> {
        self.elements_by_class(class).into_iter().next()
    }

    /// Returns the document's root element (`<html>`).
    fn root(&self) -> Option<Self::Element>;

    /// Returns the element's text content.
    fn text(&self, el: &Self::Element) -> String;

    /// Replaces the element's content with a single text node.
    fn set_text(&self, el: &Self::Element, text: &str);

    /// Reads an attribute.
    fn attribute(&self, el: &Self::Element, name: &str) -> Option<String>;

    /// Writes an attribute.
    fn set_attribute(&self, el: &Self::Element, name: &str, value: &str) -> Result<(), FolioError>;

    /// Removes an attribute. Removing an absent attribute is not an error.
    fn remove_attribute(&self, el: &Self::Element, name: &str) -> Result<(), FolioError>;

    /// Returns `true` if the element carries `class`.
    fn has_class(&self, el: &Self::Element, class: &str) -> bool;

    /// Adds a class (no-op if already present).
    fn add_class(&self, el: &Self::Element, class: &str) -> Result<(), FolioError>;

    /// Removes a class (no-op if absent).
    fn remove_class(&self, el: &Self::Element, class: &str) -> Result<(), FolioError>;

    /// Replaces the whole class list.
    fn set_class_name(&self, el: &Self::Element, class_name: &str);

    /// Sets an inline style property.
    fn set_style(&self, el: &Self::Element, property: &str, value: &str)
    -> Result<(), FolioError>;

    /// Materializes `fragment` as the last child of `parent`.
    fn append(&self, parent: &Self::Element, fragment: &Fragment)
    -> Result<Self::Element, FolioError>;

    /// Replaces all children of `parent` with the given fragments, in order,
    /// and returns the new top-level elements.
    fn replace_children(
        &self,
        parent: &Self::Element,
        fragments: &[Fragment],
    ) -> Result<Vec<Self::Element>, FolioError>;

    /// Returns the next sibling that is an element.
    fn next_element_sibling(&self, el: &Self::Element) -> Option<Self::Element>;

    /// Returns the nearest inclusive ancestor carrying `class`.
    fn closest(&self, el: &Self::Element, class: &str) -> Option<Self::Element>;

    /// Returns `true` if the pointer is over the element.
    fn is_hovered(&self, el: &Self::Element) -> bool;

    /// Returns the viewport height in CSS pixels.
    fn viewport_height(&self) -> f64;

    /// Returns the element's top edge relative to the viewport, in CSS pixels.
    fn element_top(&self, el: &Self::Element) -> f64;

    /// Returns the element's rendered height in CSS pixels.
    fn element_height(&self, el: &Self::Element) -> f64;

    /// Registers an event listener for the lifetime of the page.
    fn on(
        &self,
        target: EventTarget<'_, Self::Element>,
        kind: EventKind,
        handler: Handler<Self::Element>,
    ) -> Result<(), FolioError>;

    /// Capability probe for the host's visibility-detection facility.
    fn supports_intersection_observer(&self) -> bool;

    /// Observes `targets` and delivers intersection batches to `callback`.
    ///
    /// Only called when
    /// [`supports_intersection_observer`](Self::supports_intersection_observer)
    /// returns `true`.
    fn observe_intersections(
        &self,
        targets: &[Self::Element],
        options: ObserverOptions,
        callback: IntersectionCallback<Self::Element>,
    ) -> Result<(), FolioError>;
}

/// Looks up a required element by id, logging a warning when it is absent.
pub fn require_id<U: UiPort>(ui: &U, id: &str) -> Result<U::Element, FolioError> {
    ui.element_by_id(id).ok_or_else(|| {
        tracing::warn!(id, "element not found");
        FolioError::MissingElement(id.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_builder_keeps_order() {
        let f = Fragment::new("a")
            .class("pub-link")
            .attr("href", "https://example.org")
            .attr("target", "_blank")
            .child(Fragment::new("i").class("fas"))
            .text(" Read Paper");
        assert_eq!(f.tag(), "a");
        assert_eq!(f.attribute("target"), Some("_blank"));
        assert_eq!(f.attribute("missing"), None);
        assert_eq!(f.children().len(), 2);
        assert_eq!(f.text_content(), " Read Paper");
    }

    #[test]
    fn fragment_display_is_markup_like() {
        let f = Fragment::new("div")
            .class("skill-tag")
            .class("big")
            .attr("data-x", "1")
            .text("Rust");
        assert_eq!(
            alloc::format!("{f}"),
            "<div class=\"skill-tag big\" data-x=\"1\">Rust</div>"
        );
    }

    #[test]
    fn root_margin_shrinks_bottom() {
        let opts = ObserverOptions {
            threshold: 0.2,
            bottom_margin: 0.2,
        };
        assert_eq!(opts.root_margin(), "0px 0px -20% 0px");
    }

    #[test]
    fn prevent_default_is_recorded() {
        let e: UiEvent<u32> = UiEvent::new(EventKind::KeyDown).with_key("Enter");
        assert!(!e.default_prevented());
        e.prevent_default();
        assert!(e.default_prevented());
        assert_eq!(e.kind.as_str(), "keydown");
    }
}
