// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Injectable timers and the sequential step loop.
//!
//! [`Timers`] is the host's one-shot timer facility (`setTimeout` in the
//! browser, [`ManualTimers`](crate::headless::ManualTimers) in tests).
//!
//! [`run_loop`] turns a step function into an animation loop: each step
//! returns the delay before the next one, and the next step is scheduled only
//! after the current one has returned. Steps therefore never overlap and run
//! in strict order. The returned [`LoopHandle`] stops the loop.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::time::{Duration, HostTime};

/// Identifies a scheduled timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// A host timer facility.
///
/// Implementations are cheap handles onto one shared timer queue.
pub trait Timers: Clone + 'static {
    /// Returns the current host time.
    fn now(&self) -> HostTime;

    /// Runs `callback` once, `delay` from now.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancels a pending timeout. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

/// Handle to a loop started by [`run_loop`].
///
/// Dropping the handle leaves the loop running; call [`stop`](Self::stop) to
/// end it.
pub struct LoopHandle<T: Timers> {
    inner: Rc<LoopInner<T>>,
}

struct LoopInner<T> {
    timers: T,
    stopped: Cell<bool>,
    pending: Cell<Option<TimerId>>,
    steps: Cell<u64>,
}

impl<T: Timers> LoopHandle<T> {
    /// Stops the loop and cancels the pending step. Idempotent.
    pub fn stop(&self) {
        if self.inner.stopped.replace(true) {
            return;
        }
        if let Some(id) = self.inner.pending.take() {
            self.inner.timers.clear_timeout(id);
        }
    }

    /// Returns `true` while the loop will keep stepping.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.inner.stopped.get()
    }

    /// Returns how many steps have run so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.inner.steps.get()
    }
}

impl<T: Timers> Clone for LoopHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Timers> fmt::Debug for LoopHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopHandle")
            .field("running", &self.is_running())
            .field("steps", &self.steps())
            .field("pending", &self.inner.pending.get())
            .finish_non_exhaustive()
    }
}

type Step = Rc<RefCell<dyn FnMut() -> Option<Duration>>>;

/// Starts a step loop.
///
/// `step` runs `first_delay` from now. Each call returns `Some(delay)` to be
/// called again after `delay`, or `None` to end the loop.
pub fn run_loop<T, F>(timers: &T, first_delay: Duration, step: F) -> LoopHandle<T>
where
    T: Timers,
    F: FnMut() -> Option<Duration> + 'static,
{
    let inner = Rc::new(LoopInner {
        timers: timers.clone(),
        stopped: Cell::new(false),
        pending: Cell::new(None),
        steps: Cell::new(0),
    });
    let step: Step = Rc::new(RefCell::new(step));
    schedule(&inner, first_delay, step);
    LoopHandle { inner }
}

fn schedule<T: Timers>(inner: &Rc<LoopInner<T>>, delay: Duration, step: Step) {
    let this = Rc::clone(inner);
    let id = inner.timers.set_timeout(
        delay,
        Box::new(move || {
            this.pending.set(None);
            if this.stopped.get() {
                return;
            }
            this.steps.set(this.steps.get() + 1);
            // The borrow ends before the next step is scheduled.
            let next = {
                let mut f = step.borrow_mut();
                (*f)()
            };
            match next {
                Some(delay) if !this.stopped.get() => schedule(&this, delay, step),
                Some(_) => {}
                None => this.stopped.set(true),
            }
        }),
    );
    inner.pending.set(Some(id));
}
