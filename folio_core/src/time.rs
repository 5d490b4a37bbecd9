// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Millisecond host time.
//!
//! [`HostTime`] is a point on the host's monotonic clock (for the browser,
//! `performance.now()` truncated to whole milliseconds). [`Duration`] is a
//! timer delay in the same unit, which is what `setTimeout` accepts.

use core::fmt;

/// Milliseconds since the host's time origin.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw millisecond value.
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Returns the time `delay` after `self`, clamped at the end of the clock.
    #[must_use]
    pub const fn saturating_add(self, delay: Duration) -> Self {
        Self(self.0.saturating_add(delay.0))
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ms", self.0)
    }
}

/// A timer delay in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// Fire as soon as possible.
    pub const ZERO: Self = Self(0);

    /// Returns the raw millisecond value.
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn deadlines_clamp_instead_of_wrapping() {
        assert_eq!(HostTime(1_000).saturating_add(Duration(80)), HostTime(1_080));
        assert_eq!(HostTime(u64::MAX).saturating_add(Duration(1)), HostTime(u64::MAX));
    }

    #[test]
    fn debug_shows_units() {
        assert_eq!(format!("{:?}", HostTime(25)), "t=25ms");
        assert_eq!(format!("{:?}", Duration(2_000)), "2000ms");
    }
}
