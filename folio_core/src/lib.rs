// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-agnostic controllers for an interactive single-page portfolio.
//!
//! `folio_core` holds the small state machines that animate and filter a
//! portfolio page. It is `no_std` compatible (with `alloc`) and never touches
//! a browser directly: every controller talks to the host through three
//! ports, so the same code runs against the DOM and against the in-memory
//! page in [`headless`].
//!
//! # Architecture
//!
//! ```text
//!   Host (browser, headless page)
//!       │ UiPort · Timers · PreferenceStore
//!       ▼
//!   Page::init ──┬─► PreferenceToggle   (theme)
//!                ├─► TextCycler         (cycler)  ──► timer::run_loop
//!                ├─► ParticleField      (particles)
//!                ├─► VisibilityWatcher  (reveal)   ──► Debounce
//!                ├─► CategoryFilter     (publications)
//!                └─► skills, year, tooltips (page)
//! ```
//!
//! **[`ui`]**: The [`UiPort`](ui::UiPort) trait, renderable
//! [`Fragment`](ui::Fragment)s and event types.
//!
//! **[`timer`]**: The [`Timers`](timer::Timers) port plus the sequential
//! step loop used by the text cycler.
//!
//! **[`debounce`]**: Trailing-edge debounce on top of [`Timers`](timer::Timers).
//!
//! **[`store`]**: Key-value [`PreferenceStore`](store::PreferenceStore) port.
//!
//! **[`cycler`]**, **[`particles`]**, **[`reveal`]**, **[`theme`]**,
//! **[`publications`]**: The five controllers.
//!
//! **[`page`]**: Remaining page behaviors and the [`Page`](page::Page)
//! initializer that wires everything together.
//!
//! **[`headless`]**: In-memory implementations of every port.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod content;
pub mod cycler;
pub mod debounce;
pub mod error;
pub mod headless;
pub mod page;
pub mod particles;
pub mod publications;
pub mod reveal;
pub mod store;
pub mod theme;
pub mod time;
pub mod timer;
pub mod ui;

pub use error::FolioError;
