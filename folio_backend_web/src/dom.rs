// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live document access.
//!
//! [`DomPort`] implements [`UiPort`] over `window.document`. Fragments become
//! real element and text nodes, never parsed markup. Event listeners and
//! observer callbacks live as long as the page, so their JS closures are
//! handed to the browser with [`Closure::forget`].

use folio_core::FolioError;
use folio_core::ui::{
    EventKind, EventTarget, Fragment, Handler, Intersection, IntersectionCallback, Node,
    ObserverOptions, UiEvent, UiPort,
};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, Window,
};

use crate::host_error;

/// [`UiPort`] over the browser document.
#[derive(Clone, Debug)]
pub struct DomPort {
    window: Window,
    document: Document,
}

impl DomPort {
    /// Binds to the current window and its document.
    pub fn new() -> Result<Self, FolioError> {
        let window = web_sys::window().ok_or_else(|| FolioError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| FolioError::Host("window has no document".into()))?;
        Ok(Self { window, document })
    }

    /// Returns the window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Creates the nodes for `fragment` without attaching them.
    fn build(&self, fragment: &Fragment) -> Result<Element, FolioError> {
        let el = self
            .document
            .create_element(fragment.tag())
            .map_err(|e| host_error("createElement", &e))?;
        if !fragment.classes().is_empty() {
            el.set_class_name(&fragment.class_name());
        }
        for (name, value) in fragment.attributes() {
            el.set_attribute(name, value)
                .map_err(|e| host_error("setAttribute", &e))?;
        }
        for child in fragment.children() {
            let node: web_sys::Node = match child {
                Node::Element(f) => self.build(f)?.into(),
                Node::Text(t) => self.document.create_text_node(t).into(),
            };
            el.append_child(&node)
                .map_err(|e| host_error("appendChild", &e))?;
        }
        Ok(el)
    }

    fn event_target(&self, target: &EventTarget<'_, Element>) -> web_sys::EventTarget {
        match target {
            EventTarget::Element(el) => (*el).clone().into(),
            EventTarget::Document => self.document.clone().into(),
            EventTarget::Window => self.window.clone().into(),
        }
    }
}

impl UiPort for DomPort {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn elements_by_class(&self, class: &str) -> Vec<Element> {
        let live = self.document.get_elements_by_class_name(class);
        // The collection is live; snapshot it before anyone mutates classes.
        (0..live.length()).filter_map(|i| live.item(i)).collect()
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn text(&self, el: &Element) -> String {
        el.text_content().unwrap_or_default()
    }

    fn set_text(&self, el: &Element, text: &str) {
        el.set_text_content(Some(text));
    }

    fn attribute(&self, el: &Element, name: &str) -> Option<String> {
        el.get_attribute(name)
    }

    fn set_attribute(&self, el: &Element, name: &str, value: &str) -> Result<(), FolioError> {
        el.set_attribute(name, value)
            .map_err(|e| host_error("setAttribute", &e))
    }

    fn remove_attribute(&self, el: &Element, name: &str) -> Result<(), FolioError> {
        el.remove_attribute(name)
            .map_err(|e| host_error("removeAttribute", &e))
    }

    fn has_class(&self, el: &Element, class: &str) -> bool {
        el.class_list().contains(class)
    }

    fn add_class(&self, el: &Element, class: &str) -> Result<(), FolioError> {
        el.class_list()
            .add_1(class)
            .map_err(|e| host_error("classList.add", &e))
    }

    fn remove_class(&self, el: &Element, class: &str) -> Result<(), FolioError> {
        el.class_list()
            .remove_1(class)
            .map_err(|e| host_error("classList.remove", &e))
    }

    fn set_class_name(&self, el: &Element, class_name: &str) {
        el.set_class_name(class_name);
    }

    fn set_style(&self, el: &Element, property: &str, value: &str) -> Result<(), FolioError> {
        let html = el
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| FolioError::Host(format!("<{}> has no inline style", el.tag_name())))?;
        html.style()
            .set_property(property, value)
            .map_err(|e| host_error("style.setProperty", &e))
    }

    fn append(&self, parent: &Element, fragment: &Fragment) -> Result<Element, FolioError> {
        let el = self.build(fragment)?;
        parent
            .append_child(&el)
            .map_err(|e| host_error("appendChild", &e))?;
        Ok(el)
    }

    fn replace_children(
        &self,
        parent: &Element,
        fragments: &[Fragment],
    ) -> Result<Vec<Element>, FolioError> {
        let built = fragments
            .iter()
            .map(|f| self.build(f))
            .collect::<Result<Vec<_>, _>>()?;
        parent.set_text_content(None);
        for el in &built {
            parent
                .append_child(el)
                .map_err(|e| host_error("appendChild", &e))?;
        }
        Ok(built)
    }

    fn next_element_sibling(&self, el: &Element) -> Option<Element> {
        el.next_element_sibling()
    }

    fn closest(&self, el: &Element, class: &str) -> Option<Element> {
        el.closest(&format!(".{class}")).ok().flatten()
    }

    fn is_hovered(&self, el: &Element) -> bool {
        el.matches(":hover").unwrap_or(false)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn element_top(&self, el: &Element) -> f64 {
        el.get_bounding_client_rect().top()
    }

    fn element_height(&self, el: &Element) -> f64 {
        el.get_bounding_client_rect().height()
    }

    fn on(
        &self,
        target: EventTarget<'_, Element>,
        kind: EventKind,
        mut handler: Handler<Element>,
    ) -> Result<(), FolioError> {
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let mut ui_event = UiEvent::new(kind);
            if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
                ui_event = ui_event.with_key(key);
            }
            if let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                ui_event = ui_event.with_target(el);
            }
            handler(&ui_event);
            if ui_event.default_prevented() {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        self.event_target(&target)
            .add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
            .map_err(|e| host_error("addEventListener", &e))?;
        closure.forget();
        Ok(())
    }

    fn supports_intersection_observer(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }

    fn observe_intersections(
        &self,
        targets: &[Element],
        options: ObserverOptions,
        mut callback: IntersectionCallback<Element>,
    ) -> Result<(), FolioError> {
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array, _: JsValue| {
            let batch: Vec<Intersection<Element>> = entries
                .iter()
                .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|e| Intersection {
                    target: e.target(),
                    is_intersecting: e.is_intersecting(),
                })
                .collect();
            callback(&batch);
        }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin());
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(|e| host_error("IntersectionObserver", &e))?;
        for target in targets {
            observer.observe(target);
        }
        closure.forget();
        tracing::debug!(targets = targets.len(), "intersection observer attached");
        Ok(())
    }
}
