// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory hosts for every port.
//!
//! - [`ManualTimers`]: a [`Timers`] queue driven by [`advance`](ManualTimers::advance).
//! - [`HeadlessPage`]: a small element tree implementing [`UiPort`], with
//!   scriptable geometry, hover state, events, and an optional intersection
//!   observer.
//!
//! [`MemoryStore`](crate::store::MemoryStore) covers the preference port.
//!
//! Both types are handles: clones share state, so a test can keep one copy
//! for inspection while the controllers own others.

use alloc::boxed::Box;
use alloc::borrow::ToOwned as _;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::error::FolioError;
use crate::reveal::in_trigger_zone;
use crate::time::{Duration, HostTime};
use crate::timer::{TimerId, Timers};
use crate::ui::{
    EventKind, EventTarget, Fragment, Handler, Intersection, IntersectionCallback, Node,
    ObserverOptions, UiEvent, UiPort,
};

// ---------------------------------------------------------------------------
// ManualTimers
// ---------------------------------------------------------------------------

/// A deterministic [`Timers`] implementation.
///
/// Time only moves when [`advance`](Self::advance) is called. Due callbacks
/// fire in deadline order (ties in scheduling order), each one seeing
/// [`now`](Timers::now) equal to its own deadline.
#[derive(Clone, Default)]
pub struct ManualTimers {
    queue: Rc<RefCell<TimerQueue>>,
}

#[derive(Default)]
struct TimerQueue {
    now: HostTime,
    next_id: u64,
    entries: Vec<TimerEntry>,
}

struct TimerEntry {
    id: TimerId,
    due: HostTime,
    callback: Box<dyn FnOnce()>,
}

impl ManualTimers {
    /// Creates a queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `by`, firing every callback that falls due.
    ///
    /// Callbacks scheduled while advancing fire too if their deadline is
    /// within the window. Returns how many callbacks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.queue.borrow().now.saturating_add(by);
        let mut fired = 0;
        loop {
            let next = {
                let mut q = self.queue.borrow_mut();
                let idx = q
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due <= target)
                    .min_by_key(|(_, e)| (e.due, e.id))
                    .map(|(i, _)| i);
                idx.map(|i| {
                    let entry = q.entries.swap_remove(i);
                    q.now = entry.due;
                    entry.callback
                })
            };
            match next {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        self.queue.borrow_mut().now = target;
        fired
    }

    /// Returns the number of scheduled callbacks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }
}

impl Timers for ManualTimers {
    fn now(&self) -> HostTime {
        self.queue.borrow().now
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut q = self.queue.borrow_mut();
        let id = TimerId(q.next_id);
        q.next_id += 1;
        let due = q.now.saturating_add(delay);
        q.entries.push(TimerEntry { id, due, callback });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.queue.borrow_mut().entries.retain(|e| e.id != id);
    }
}

impl fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.queue.borrow();
        f.debug_struct("ManualTimers")
            .field("now", &q.now)
            .field("pending", &q.entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// HeadlessPage
// ---------------------------------------------------------------------------

/// Handle to an element of a [`HeadlessPage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

const TEXT_TAG: &str = "#text";
const DEFAULT_HEIGHT: f64 = 100.0;

struct NodeData {
    tag: String,
    text: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Top edge in page coordinates.
    top: f64,
    height: f64,
    hovered: bool,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            top: 0.0,
            height: DEFAULT_HEIGHT,
            hovered: false,
        }
    }

    fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListenerTarget {
    Element(NodeId),
    Document,
    Window,
}

type SharedHandler = Rc<RefCell<Handler<NodeId>>>;

struct Listener {
    target: ListenerTarget,
    kind: EventKind,
    handler: SharedHandler,
}

struct Observer {
    targets: Vec<NodeId>,
    options: ObserverOptions,
    /// Last reported state per target; `None` until the first notification.
    last: Vec<Option<bool>>,
    callback: Rc<RefCell<IntersectionCallback<NodeId>>>,
}

struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    viewport_height: f64,
    scroll_y: f64,
    observer_support: bool,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
    /// Attribute names whose writes fail.
    rejected_attributes: Vec<String>,
}

impl Document {
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        if let Some(p) = parent {
            self.nodes[id.0].parent = Some(p);
            self.nodes[p.0].children.push(id);
        }
        id
    }

    fn build(&mut self, parent: NodeId, fragment: &Fragment) -> NodeId {
        let mut data = NodeData::element(fragment.tag());
        data.classes = fragment.classes().to_vec();
        for (name, value) in fragment.attributes() {
            data.attributes.insert(name.clone(), value.clone());
        }
        let id = self.push(Some(parent), data);
        for child in fragment.children() {
            match child {
                Node::Element(f) => {
                    self.build(id, f);
                }
                Node::Text(t) => {
                    let mut text = NodeData::element(TEXT_TAG);
                    text.text = t.clone();
                    self.push(Some(id), text);
                }
            }
        }
        id
    }

    fn check_attribute(&self, name: &str) -> Result<(), FolioError> {
        if self.rejected_attributes.iter().any(|r| r == name) {
            return Err(FolioError::Host(format!("attribute `{name}` rejected")));
        }
        Ok(())
    }

    fn detach_children(&mut self, parent: NodeId) {
        let children = core::mem::take(&mut self.node_mut(parent).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }

    /// Attached nodes in document order.
    fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn text_of(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.is_text() {
            return node.text.clone();
        }
        let mut out = String::new();
        for &c in &node.children {
            out.push_str(&self.text_of(c));
        }
        out
    }

    fn viewport_top(&self, id: NodeId) -> f64 {
        self.node(id).top - self.scroll_y
    }
}

/// An in-memory document implementing [`UiPort`].
///
/// The tree starts as `<html><body></body></html>`. Geometry is explicit:
/// each element has a page-space top and a height (100px unless set), and the
/// viewport is 800px tall and scrolled to the top.
#[derive(Clone)]
pub struct HeadlessPage {
    doc: Rc<RefCell<Document>>,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    /// Creates an empty page whose host offers an intersection observer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_observer_support(true)
    }

    /// Creates an empty page whose host has no intersection observer, so
    /// visibility detection falls back to polling.
    #[must_use]
    pub fn without_observer() -> Self {
        Self::with_observer_support(false)
    }

    fn with_observer_support(observer_support: bool) -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            viewport_height: 800.0,
            scroll_y: 0.0,
            observer_support,
            listeners: Vec::new(),
            observers: Vec::new(),
            rejected_attributes: Vec::new(),
        };
        let root = doc.push(None, NodeData::element("html"));
        let body = doc.push(Some(root), NodeData::element("body"));
        doc.root = root;
        doc.body = body;
        Self {
            doc: Rc::new(RefCell::new(doc)),
        }
    }

    /// Returns the `<body>` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.doc.borrow().body
    }

    /// Appends `fragment` under `parent` and returns the new element.
    pub fn insert(&self, parent: NodeId, fragment: &Fragment) -> NodeId {
        self.doc.borrow_mut().build(parent, fragment)
    }

    /// Appends `fragment` to the body.
    pub fn insert_into_body(&self, fragment: &Fragment) -> NodeId {
        let body = self.body();
        self.insert(body, fragment)
    }

    /// Returns the element's children (text nodes included).
    #[must_use]
    pub fn children(&self, el: NodeId) -> Vec<NodeId> {
        self.doc.borrow().node(el).children.clone()
    }

    /// Returns the element's tag name.
    #[must_use]
    pub fn tag(&self, el: NodeId) -> String {
        self.doc.borrow().node(el).tag.clone()
    }

    /// Returns an inline style property set through [`UiPort::set_style`].
    #[must_use]
    pub fn style(&self, el: NodeId, property: &str) -> Option<String> {
        self.doc.borrow().node(el).style.get(property).cloned()
    }

    /// Returns the element's class list joined by spaces.
    #[must_use]
    pub fn class_name(&self, el: NodeId) -> String {
        self.doc.borrow().node(el).classes.join(" ")
    }

    /// Places an element at `top` (page coordinates) with the given height.
    pub fn set_geometry(&self, el: NodeId, top: f64, height: f64) {
        let mut doc = self.doc.borrow_mut();
        let node = doc.node_mut(el);
        node.top = top;
        node.height = height;
    }

    /// Makes every later write or removal of attribute `name` fail with a
    /// host error.
    pub fn reject_attribute(&self, name: &str) {
        self.doc.borrow_mut().rejected_attributes.push(name.to_string());
    }

    /// Resizes the viewport.
    pub fn set_viewport_height(&self, height: f64) {
        self.doc.borrow_mut().viewport_height = height;
    }

    /// Marks the pointer as over (or off) an element.
    pub fn set_hovered(&self, el: NodeId, hovered: bool) {
        self.doc.borrow_mut().node_mut(el).hovered = hovered;
    }

    /// Scrolls to `y`, fires `scroll` on the window, then delivers any
    /// intersection changes.
    pub fn scroll_to(&self, y: f64) {
        self.doc.borrow_mut().scroll_y = y;
        self.dispatch_window(EventKind::Scroll);
        self.notify_intersections();
    }

    /// Fires `load` on the window.
    pub fn load(&self) {
        self.dispatch_window(EventKind::Load);
    }

    /// Clicks an element. The event bubbles to the document and window.
    pub fn click(&self, el: NodeId) -> UiEvent<NodeId> {
        self.fire(el, UiEvent::new(EventKind::Click).with_target(el))
    }

    /// Presses a key while `el` has focus. The event bubbles.
    pub fn key_down(&self, el: NodeId, key: &str) -> UiEvent<NodeId> {
        self.fire(el, UiEvent::new(EventKind::KeyDown).with_key(key).with_target(el))
    }

    /// Dispatches `event` at `el`.
    ///
    /// `click` and `keydown` bubble through the ancestors, then the document,
    /// then the window; other kinds only reach `el`. Returns the event so
    /// callers can inspect [`UiEvent::default_prevented`].
    pub fn fire(&self, el: NodeId, event: UiEvent<NodeId>) -> UiEvent<NodeId> {
        let bubbles = matches!(event.kind, EventKind::Click | EventKind::KeyDown);
        let mut path = vec![ListenerTarget::Element(el)];
        if bubbles {
            let doc = self.doc.borrow();
            let mut cur = doc.node(el).parent;
            while let Some(p) = cur {
                path.push(ListenerTarget::Element(p));
                cur = doc.node(p).parent;
            }
            path.push(ListenerTarget::Document);
            path.push(ListenerTarget::Window);
        }
        for target in path {
            self.dispatch(target, &event);
        }
        event
    }

    fn dispatch_window(&self, kind: EventKind) {
        self.dispatch(ListenerTarget::Window, &UiEvent::new(kind));
    }

    fn dispatch(&self, target: ListenerTarget, event: &UiEvent<NodeId>) {
        let handlers: Vec<SharedHandler> = self
            .doc
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == target && l.kind == event.kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        for handler in handlers {
            let mut h = handler.borrow_mut();
            (*h)(event);
        }
    }

    /// Returns the number of nodes ever created, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.doc.borrow().nodes.len()
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.doc.borrow().listeners.len()
    }

    /// Returns the number of active intersection observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.doc.borrow().observers.len()
    }

    /// Delivers one notification batch per observer, holding every target
    /// whose intersecting state changed since the previous batch (all targets
    /// on the first batch). Observers with no changes are not called.
    pub fn notify_intersections(&self) {
        let mut batches = Vec::new();
        {
            let mut guard = self.doc.borrow_mut();
            let doc = &mut *guard;
            for observer in &mut doc.observers {
                let mut entries = Vec::new();
                for (i, &target) in observer.targets.iter().enumerate() {
                    let node = &doc.nodes[target.0];
                    let is_intersecting = in_trigger_zone(
                        node.top - doc.scroll_y,
                        node.height,
                        doc.viewport_height,
                        observer.options,
                    );
                    if observer.last[i] != Some(is_intersecting) {
                        observer.last[i] = Some(is_intersecting);
                        entries.push(Intersection {
                            target,
                            is_intersecting,
                        });
                    }
                }
                if !entries.is_empty() {
                    batches.push((Rc::clone(&observer.callback), entries));
                }
            }
        }
        for (callback, entries) in batches {
            let mut cb = callback.borrow_mut();
            (*cb)(&entries);
        }
    }
}

impl fmt::Debug for HeadlessPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc.borrow();
        f.debug_struct("HeadlessPage")
            .field("nodes", &doc.nodes.len())
            .field("listeners", &doc.listeners.len())
            .field("observers", &doc.observers.len())
            .field("scroll_y", &doc.scroll_y)
            .finish()
    }
}

impl UiPort for HeadlessPage {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let doc = self.doc.borrow();
        doc.walk()
            .into_iter()
            .find(|&n| doc.node(n).attributes.get("id").is_some_and(|v| v == id))
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let doc = self.doc.borrow();
        doc.walk()
            .into_iter()
            .filter(|&n| doc.node(n).classes.iter().any(|c| c == class))
            .collect()
    }

    fn root(&self) -> Option<NodeId> {
        Some(self.doc.borrow().root)
    }

    fn text(&self, el: &NodeId) -> String {
        self.doc.borrow().text_of(*el)
    }

    fn set_text(&self, el: &NodeId, text: &str) {
        let mut doc = self.doc.borrow_mut();
        if let [only] = doc.node(*el).children[..]
            && doc.node(only).is_text()
        {
            text.clone_into(&mut doc.node_mut(only).text);
            return;
        }
        doc.detach_children(*el);
        let mut node = NodeData::element(TEXT_TAG);
        node.text = text.to_string();
        doc.push(Some(*el), node);
    }

    fn attribute(&self, el: &NodeId, name: &str) -> Option<String> {
        self.doc.borrow().node(*el).attributes.get(name).cloned()
    }

    fn set_attribute(&self, el: &NodeId, name: &str, value: &str) -> Result<(), FolioError> {
        let mut doc = self.doc.borrow_mut();
        doc.check_attribute(name)?;
        doc.node_mut(*el)
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, el: &NodeId, name: &str) -> Result<(), FolioError> {
        let mut doc = self.doc.borrow_mut();
        doc.check_attribute(name)?;
        doc.node_mut(*el).attributes.remove(name);
        Ok(())
    }

    fn has_class(&self, el: &NodeId, class: &str) -> bool {
        self.doc.borrow().node(*el).classes.iter().any(|c| c == class)
    }

    fn add_class(&self, el: &NodeId, class: &str) -> Result<(), FolioError> {
        let mut doc = self.doc.borrow_mut();
        let classes = &mut doc.node_mut(*el).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&self, el: &NodeId, class: &str) -> Result<(), FolioError> {
        self.doc
            .borrow_mut()
            .node_mut(*el)
            .classes
            .retain(|c| c != class);
        Ok(())
    }

    fn set_class_name(&self, el: &NodeId, class_name: &str) {
        self.doc.borrow_mut().node_mut(*el).classes =
            class_name.split_whitespace().map(String::from).collect();
    }

    fn set_style(&self, el: &NodeId, property: &str, value: &str) -> Result<(), FolioError> {
        self.doc
            .borrow_mut()
            .node_mut(*el)
            .style
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn append(&self, parent: &NodeId, fragment: &Fragment) -> Result<NodeId, FolioError> {
        Ok(self.doc.borrow_mut().build(*parent, fragment))
    }

    fn replace_children(
        &self,
        parent: &NodeId,
        fragments: &[Fragment],
    ) -> Result<Vec<NodeId>, FolioError> {
        let mut doc = self.doc.borrow_mut();
        doc.detach_children(*parent);
        Ok(fragments.iter().map(|f| doc.build(*parent, f)).collect())
    }

    fn next_element_sibling(&self, el: &NodeId) -> Option<NodeId> {
        let doc = self.doc.borrow();
        let parent = doc.node(*el).parent?;
        let siblings = &doc.node(parent).children;
        let pos = siblings.iter().position(|s| s == el)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&s| !doc.node(s).is_text())
    }

    fn closest(&self, el: &NodeId, class: &str) -> Option<NodeId> {
        let doc = self.doc.borrow();
        let mut cur = Some(*el);
        while let Some(id) = cur {
            if doc.node(id).classes.iter().any(|c| c == class) {
                return Some(id);
            }
            cur = doc.node(id).parent;
        }
        None
    }

    fn is_hovered(&self, el: &NodeId) -> bool {
        self.doc.borrow().node(*el).hovered
    }

    fn viewport_height(&self) -> f64 {
        self.doc.borrow().viewport_height
    }

    fn element_top(&self, el: &NodeId) -> f64 {
        self.doc.borrow().viewport_top(*el)
    }

    fn element_height(&self, el: &NodeId) -> f64 {
        self.doc.borrow().node(*el).height
    }

    fn on(
        &self,
        target: EventTarget<'_, NodeId>,
        kind: EventKind,
        handler: Handler<NodeId>,
    ) -> Result<(), FolioError> {
        let target = match target {
            EventTarget::Element(el) => ListenerTarget::Element(*el),
            EventTarget::Document => ListenerTarget::Document,
            EventTarget::Window => ListenerTarget::Window,
        };
        self.doc.borrow_mut().listeners.push(Listener {
            target,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
        Ok(())
    }

    fn supports_intersection_observer(&self) -> bool {
        self.doc.borrow().observer_support
    }

    fn observe_intersections(
        &self,
        targets: &[NodeId],
        options: ObserverOptions,
        callback: IntersectionCallback<NodeId>,
    ) -> Result<(), FolioError> {
        let mut doc = self.doc.borrow_mut();
        if !doc.observer_support {
            return Err(FolioError::Host("IntersectionObserver unavailable".to_string()));
        }
        doc.observers.push(Observer {
            targets: targets.to_vec(),
            options,
            last: vec![None; targets.len()],
            callback: Rc::new(RefCell::new(callback)),
        });
        Ok(())
    }
}
