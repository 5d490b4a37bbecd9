// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` timer source.
//!
//! [`WindowTimers`] implements [`Timers`] with the browser's one-shot timers.
//! Each pending callback is wrapped in a JS closure owned by a shared table
//! keyed by [`TimerId`]. A closure must outlive its own invocation, so fired
//! and cancelled closures move to a retired list. The list is emptied when a
//! callback starts with no other callback on the stack, and by any
//! scheduling call made outside a callback.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use folio_core::time::{Duration, HostTime};
use folio_core::timer::{TimerId, Timers};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, so scheduling
// doesn't need a `Window` handle.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout_js(handler: &JsValue, timeout: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout_js(id: i32);
}

type TimeoutClosure = Closure<dyn FnMut()>;

/// Browser timers.
///
/// Clones share one table of pending callbacks.
#[derive(Clone, Default)]
pub struct WindowTimers {
    table: Rc<TimerTable<TimeoutClosure>>,
}

/// Bookkeeping for scheduled callbacks, generic over the owned closure.
struct TimerTable<C> {
    next_id: Cell<u64>,
    /// Pending timeouts: our id → (browser id, closure).
    live: RefCell<BTreeMap<u64, (i32, C)>>,
    /// Closures that have fired or been cancelled.
    retired: RefCell<Vec<C>>,
    /// Depth of timer callbacks currently executing.
    firing: Cell<u32>,
}

impl<C> Default for TimerTable<C> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            live: RefCell::new(BTreeMap::new()),
            retired: RefCell::new(Vec::new()),
            firing: Cell::new(0),
        }
    }
}

impl<C> TimerTable<C> {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn insert(&self, id: u64, js_id: i32, closure: C) {
        self.live.borrow_mut().insert(id, (js_id, closure));
    }

    fn retire(&self, id: u64) -> Option<i32> {
        let (js_id, closure) = self.live.borrow_mut().remove(&id)?;
        self.retired.borrow_mut().push(closure);
        Some(js_id)
    }

    fn sweep(&self) {
        if self.firing.get() == 0 {
            self.retired.borrow_mut().clear();
        }
    }

    /// Marks callback `id` as running. Only the closures of callbacks still
    /// on the stack survive the sweep done here.
    fn enter(&self, id: u64) {
        self.sweep();
        self.firing.set(self.firing.get() + 1);
        self.retire(id);
    }

    fn leave(&self) {
        self.firing.set(self.firing.get() - 1);
    }
}

impl WindowTimers {
    /// Creates an empty timer table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of scheduled callbacks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.table.live.borrow().len()
    }
}

impl Timers for WindowTimers {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        self.table.sweep();
        let id = self.table.next_id();

        let table = Rc::clone(&self.table);
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            table.enter(id);
            if let Some(callback) = callback.take() {
                callback();
            }
            table.leave();
        }) as Box<dyn FnMut()>);

        let js_id = set_timeout_js(closure.as_ref().unchecked_ref(), timeout_millis(delay));
        self.table.insert(id, js_id, closure);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(js_id) = self.table.retire(id.0) {
            clear_timeout_js(js_id);
        }
        self.table.sweep();
    }
}

impl fmt::Debug for WindowTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowTimers")
            .field("pending", &self.pending())
            .field("retired", &self.table.retired.borrow().len())
            .finish()
    }
}

/// Clamps a delay to the range `setTimeout` accepts.
fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.millis()).unwrap_or(i32::MAX)
}
