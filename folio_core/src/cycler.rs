// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typewriter text cycler.
//!
//! [`TextCycler`] types a phrase one character at a time, holds it, deletes
//! it one character at a time, then moves to the next phrase, forever. Each
//! [`step`](TextCycler::step) performs one transition and returns the delay
//! before the next one; [`start`] drives the steps with
//! [`run_loop`](crate::timer::run_loop).
//!
//! ```text
//!            char_index == len
//!   Typing ─────────────────────► PausedBeforeDelete
//!     ▲                                  │ (pause elapsed)
//!     │ char_index == 0,                 ▼
//!     │ next phrase                  Deleting
//!     └──────────────────────────────────┘
//! ```

use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::error::FolioError;
use crate::time::Duration;
use crate::timer::{LoopHandle, Timers, run_loop};
use crate::ui::{UiPort, require_id};

/// Phrases shown in the portfolio hero.
pub const PORTFOLIO_PHRASES: &[&str] = &[
    "Artificial Intelligence | Machine Learning | Neuroscience",
    "Bridging AI and Healthcare",
    "Medical Imaging & Diagnostics",
];

/// Timing and content for a [`TextCycler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CyclerConfig {
    /// Phrases to cycle through, in order.
    pub phrases: &'static [&'static str],
    /// Delay between typed characters.
    pub typing_speed: Duration,
    /// Delay between deleted characters.
    pub deleting_speed: Duration,
    /// How long a fully typed phrase stays on screen.
    pub pause: Duration,
    /// Delay before the first character.
    pub start_delay: Duration,
    /// Id of the element showing the text.
    pub target_id: &'static str,
}

impl CyclerConfig {
    /// Settings used by the portfolio hero.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            phrases: PORTFOLIO_PHRASES,
            typing_speed: Duration(80),
            deleting_speed: Duration(50),
            pause: Duration(2_000),
            start_delay: Duration(500),
            target_id: "typed-text",
        }
    }
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// What the next [`step`](TextCycler::step) will do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CyclerPhase {
    /// Appending characters.
    Typing,
    /// Holding the full phrase.
    PausedBeforeDelete,
    /// Removing characters.
    Deleting,
}

/// Position of a [`TextCycler`].
///
/// `char_index` counts characters (not bytes) of the phrase at `text_index`
/// and never exceeds its length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CyclerState {
    /// Index of the current phrase.
    pub text_index: usize,
    /// Number of characters currently shown.
    pub char_index: usize,
    /// `true` from the end of the pause until the phrase is fully deleted.
    pub is_deleting: bool,
}

/// The typewriter state machine.
#[derive(Clone, Debug)]
pub struct TextCycler {
    phrases: Vec<String>,
    config: CyclerConfig,
    state: CyclerState,
    phase: CyclerPhase,
}

impl TextCycler {
    /// Creates a cycler over the configured phrases.
    pub fn new(config: CyclerConfig) -> Result<Self, FolioError> {
        Self::with_phrases(config.phrases.iter().map(|p| p.to_string()), config)
    }

    /// Creates a cycler over `phrases`, taking timing from `config`.
    ///
    /// Fails with [`FolioError::EmptyPhrases`] if there are no phrases.
    pub fn with_phrases(
        phrases: impl IntoIterator<Item = String>,
        config: CyclerConfig,
    ) -> Result<Self, FolioError> {
        let phrases: Vec<String> = phrases.into_iter().collect();
        if phrases.is_empty() {
            return Err(FolioError::EmptyPhrases);
        }
        Ok(Self {
            phrases,
            config,
            state: CyclerState::default(),
            phase: CyclerPhase::Typing,
        })
    }

    /// Returns the current position.
    #[must_use]
    pub fn state(&self) -> CyclerState {
        self.state
    }

    /// Returns what the next step will do.
    #[must_use]
    pub fn phase(&self) -> CyclerPhase {
        self.phase
    }

    /// Returns the phrase at `text_index`.
    #[must_use]
    pub fn current_phrase(&self) -> &str {
        &self.phrases[self.state.text_index]
    }

    /// Returns the text currently displayed.
    #[must_use]
    pub fn visible_text(&self) -> &str {
        let phrase = self.current_phrase();
        let end = phrase
            .char_indices()
            .nth(self.state.char_index)
            .map_or(phrase.len(), |(i, _)| i);
        &phrase[..end]
    }

    /// Number of phrases.
    #[must_use]
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// Performs one transition, shows the result on `target`, and returns the
    /// delay before the next step.
    pub fn step<U: UiPort>(&mut self, ui: &U, target: &U::Element) -> Duration {
        let delay = self.advance();
        ui.set_text(target, self.visible_text());
        delay
    }

    /// Performs one transition without touching any element.
    pub fn advance(&mut self) -> Duration {
        match self.phase {
            CyclerPhase::Typing => {
                let len = self.current_phrase().chars().count();
                if self.state.char_index < len {
                    self.state.char_index += 1;
                }
                if self.state.char_index == len {
                    self.phase = CyclerPhase::PausedBeforeDelete;
                    self.config.pause
                } else {
                    self.config.typing_speed
                }
            }
            CyclerPhase::PausedBeforeDelete => {
                self.phase = CyclerPhase::Deleting;
                self.state.is_deleting = true;
                self.delete_one()
            }
            CyclerPhase::Deleting => self.delete_one(),
        }
    }

    fn delete_one(&mut self) -> Duration {
        self.state.char_index = self.state.char_index.saturating_sub(1);
        if self.state.char_index == 0 {
            self.state.text_index = (self.state.text_index + 1) % self.phrases.len();
            self.state.is_deleting = false;
            self.phase = CyclerPhase::Typing;
            self.config.typing_speed
        } else {
            self.config.deleting_speed
        }
    }
}

/// A running text cycler.
///
/// Dropping the handle leaves the animation running.
pub struct CycleHandle<T: Timers> {
    cycler: Rc<RefCell<TextCycler>>,
    handle: LoopHandle<T>,
}

impl<T: Timers> CycleHandle<T> {
    /// Stops the animation; no further step runs.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Returns `true` until [`stop`](Self::stop) is called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Returns the cycler's current position.
    #[must_use]
    pub fn state(&self) -> CyclerState {
        self.cycler.borrow().state()
    }

    /// Returns how many steps have run.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.handle.steps()
    }
}

impl<T: Timers> fmt::Debug for CycleHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleHandle")
            .field("state", &self.state())
            .field("handle", &self.handle)
            .finish()
    }
}

/// Starts cycling the configured phrases in the configured element.
///
/// Returns `None`, after logging a warning, if the element is missing or the
/// phrase list is empty.
pub fn start<U: UiPort, T: Timers>(
    ui: &U,
    timers: &T,
    config: CyclerConfig,
) -> Option<CycleHandle<T>> {
    let target = require_id(ui, config.target_id).ok()?;
    let cycler = match TextCycler::new(config) {
        Ok(c) => Rc::new(RefCell::new(c)),
        Err(err) => {
            tracing::warn!(%err, "text cycler not started");
            return None;
        }
    };
    let ui = ui.clone();
    let stepper = Rc::clone(&cycler);
    let handle = run_loop(timers, config.start_delay, move || {
        Some(stepper.borrow_mut().step(&ui, &target))
    });
    Some(CycleHandle { cycler, handle })
}
