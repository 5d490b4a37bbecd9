// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge debounce.
//!
//! A [`Debounce`] wraps a function so that a burst of calls collapses into a
//! single invocation. Every [`call`](Debounce::call) cancels the pending
//! invocation and schedules a new one `wait` later, so only the last call of a
//! burst runs, with its own arguments, once the burst has been quiet for
//! `wait`.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::time::Duration;
use crate::timer::{TimerId, Timers};

/// A debounced function taking `A`.
pub struct Debounce<T: Timers, A> {
    timers: T,
    wait: Duration,
    inner: Rc<Inner<A>>,
}

struct Inner<A> {
    pending: Cell<Option<TimerId>>,
    func: RefCell<Box<dyn FnMut(A)>>,
}

impl<T: Timers, A: 'static> Debounce<T, A> {
    /// Wraps `func` so it runs `wait` after the last of a burst of calls.
    pub fn new(timers: &T, wait: Duration, func: impl FnMut(A) + 'static) -> Self {
        Self {
            timers: timers.clone(),
            wait,
            inner: Rc::new(Inner {
                pending: Cell::new(None),
                func: RefCell::new(Box::new(func)),
            }),
        }
    }

    /// Records a call. Any earlier pending call is dropped.
    pub fn call(&self, args: A) {
        self.cancel();
        let inner = Rc::clone(&self.inner);
        let id = self.timers.set_timeout(
            self.wait,
            Box::new(move || {
                inner.pending.set(None);
                let mut func = inner.func.borrow_mut();
                (*func)(args);
            }),
        );
        self.inner.pending.set(Some(id));
    }

    /// Drops the pending call, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.pending.take() {
            self.timers.clear_timeout(id);
        }
    }

    /// Returns `true` while a call is waiting for the quiet period to end.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Returns the quiet period.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<T: Timers, A> Clone for Debounce<T, A> {
    fn clone(&self) -> Self {
        Self {
            timers: self.timers.clone(),
            wait: self.wait,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Timers, A> fmt::Debug for Debounce<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounce")
            .field("wait", &self.wait)
            .field("pending", &self.inner.pending.get())
            .finish_non_exhaustive()
    }
}
