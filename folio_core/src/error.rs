// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the controllers and the host ports.
//!
//! None of these are fatal. Controllers log them and carry on; the page
//! initializer logs whatever bubbles up and moves to the next controller.

use alloc::string::String;

/// Errors produced while wiring or driving the portfolio controllers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FolioError {
    /// A required element is not present in the document.
    #[error("element `{0}` not found")]
    MissingElement(String),
    /// Externally supplied data is missing or empty.
    #[error("no {0} data supplied")]
    DataAbsent(&'static str),
    /// The text cycler was configured without any phrases.
    #[error("text cycler needs at least one phrase")]
    EmptyPhrases,
    /// The particle duration range is empty or not finite.
    #[error("invalid particle duration range {min}..={max}")]
    InvalidDurationRange {
        /// Lower bound in seconds.
        min: f64,
        /// Upper bound in seconds.
        max: f64,
    },
    /// The particle delay bound is negative or not finite.
    #[error("invalid particle delay bound {max}")]
    InvalidDelay {
        /// Upper bound in seconds.
        max: f64,
    },
    /// The durable preference store rejected a read or write.
    #[error("preference store: {0}")]
    Store(String),
    /// The host environment reported an error.
    #[error("host: {0}")]
    Host(String),
}
