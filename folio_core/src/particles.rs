// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decorative floating particles.
//!
//! The motion itself is a CSS animation on the `particle` class. This module
//! only picks a random position, delay and duration for each particle and
//! writes them as inline styles.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use rand::Rng;

use crate::error::FolioError;
use crate::ui::{Fragment, UiPort};

/// Particle generation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleConfig {
    /// Particles created per page.
    pub count: usize,
    /// Shortest animation cycle, in seconds.
    pub min_duration: f64,
    /// Longest animation cycle, in seconds.
    pub max_duration: f64,
    /// Upper bound (exclusive) of the start delay, in seconds.
    pub max_delay: f64,
    /// Id of the container the particles are appended to.
    pub container_id: &'static str,
    /// Class carried by each particle.
    pub particle_class: &'static str,
}

impl ParticleConfig {
    /// Settings used by the portfolio hero.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            count: 15,
            min_duration: 15.0,
            max_duration: 25.0,
            max_delay: 20.0,
            container_id: "particles",
            particle_class: "particle",
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Placement and timing of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleDescriptor {
    /// Horizontal position, percent of the container width, in `[0, 100)`.
    pub x_percent: f64,
    /// Vertical position, percent of the container height, in `[0, 100)`.
    pub y_percent: f64,
    /// Animation delay in seconds, in `[0, max_delay)`.
    pub delay_seconds: f64,
    /// Animation duration in seconds, in `[min_duration, max_duration]`.
    pub duration_seconds: f64,
}

impl ParticleDescriptor {
    /// Returns the inline style properties, in the order they are applied.
    #[must_use]
    pub fn styles(&self) -> [(&'static str, String); 4] {
        [
            ("left", format!("{}%", self.x_percent)),
            ("top", format!("{}%", self.y_percent)),
            ("animation-delay", format!("{}s", self.delay_seconds)),
            ("animation-duration", format!("{}s", self.duration_seconds)),
        ]
    }
}

/// Generates and places particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleField {
    config: ParticleConfig,
}

impl ParticleField {
    /// Validates `config`.
    ///
    /// The duration bounds must be finite, non-negative, and ordered; the
    /// delay bound must be finite and non-negative.
    pub fn new(config: ParticleConfig) -> Result<Self, FolioError> {
        let ParticleConfig {
            min_duration: min,
            max_duration: max,
            max_delay,
            ..
        } = config;
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
            return Err(FolioError::InvalidDurationRange { min, max });
        }
        if !(max_delay.is_finite() && max_delay >= 0.0) {
            return Err(FolioError::InvalidDelay { max: max_delay });
        }
        Ok(Self { config })
    }

    /// Returns the validated configuration.
    #[must_use]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Draws `count` descriptors from `rng`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<ParticleDescriptor> {
        let c = &self.config;
        (0..count)
            .map(|_| ParticleDescriptor {
                x_percent: rng.random_range(0.0..100.0),
                y_percent: rng.random_range(0.0..100.0),
                delay_seconds: if c.max_delay > 0.0 {
                    rng.random_range(0.0..c.max_delay)
                } else {
                    0.0
                },
                duration_seconds: rng.random_range(c.min_duration..=c.max_duration),
            })
            .collect()
    }

    /// Appends `count` particles to `container`.
    ///
    /// Calling this again appends another set; existing particles are kept.
    pub fn populate<U: UiPort, R: Rng + ?Sized>(
        &self,
        ui: &U,
        container: &U::Element,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<U::Element>, FolioError> {
        let particle = Fragment::new("div").class(self.config.particle_class);
        self.generate(rng, count)
            .iter()
            .map(|p| {
                let el = ui.append(container, &particle)?;
                for (property, value) in p.styles() {
                    ui.set_style(&el, property, &value)?;
                }
                Ok(el)
            })
            .collect()
    }

    /// Fills the configured container with the configured number of
    /// particles. Returns how many were added; `0` if the container is
    /// missing.
    pub fn populate_page<U: UiPort, R: Rng + ?Sized>(
        &self,
        ui: &U,
        rng: &mut R,
    ) -> Result<usize, FolioError> {
        let Some(container) = ui.element_by_id(self.config.container_id) else {
            tracing::warn!(id = self.config.container_id, "particle container not found");
            return Ok(0);
        };
        let added = self.populate(ui, &container, self.config.count, rng)?;
        tracing::debug!(count = added.len(), "particles added");
        Ok(added.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn field() -> ParticleField {
        ParticleField::new(ParticleConfig::portfolio()).unwrap()
    }

    #[test]
    fn rejects_inverted_or_non_finite_ranges() {
        let inverted = ParticleConfig {
            min_duration: 30.0,
            ..ParticleConfig::portfolio()
        };
        assert_eq!(
            ParticleField::new(inverted),
            Err(FolioError::InvalidDurationRange {
                min: 30.0,
                max: 25.0
            })
        );
        let nan = ParticleConfig {
            max_duration: f64::NAN,
            ..ParticleConfig::portfolio()
        };
        assert!(ParticleField::new(nan).is_err());
    }

    #[test]
    fn bad_delay_is_reported_as_a_delay_error() {
        let negative = ParticleConfig {
            max_delay: -1.0,
            ..ParticleConfig::portfolio()
        };
        assert_eq!(
            ParticleField::new(negative),
            Err(FolioError::InvalidDelay { max: -1.0 })
        );
        let infinite = ParticleConfig {
            max_delay: f64::INFINITY,
            ..ParticleConfig::portfolio()
        };
        assert!(matches!(
            ParticleField::new(infinite),
            Err(FolioError::InvalidDelay { .. })
        ));
    }

    #[test]
    fn generated_values_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        let particles = field().generate(&mut rng, 200);
        assert_eq!(particles.len(), 200);
        for p in &particles {
            assert!((0.0..100.0).contains(&p.x_percent));
            assert!((0.0..100.0).contains(&p.y_percent));
            assert!((0.0..20.0).contains(&p.delay_seconds));
            assert!((15.0..=25.0).contains(&p.duration_seconds));
        }
    }

    #[test]
    fn zero_count_and_degenerate_ranges() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(field().generate(&mut rng, 0).is_empty());

        let fixed = ParticleField::new(ParticleConfig {
            min_duration: 3.0,
            max_duration: 3.0,
            max_delay: 0.0,
            ..ParticleConfig::portfolio()
        })
        .unwrap();
        let p = fixed.generate(&mut rng, 1)[0];
        assert_eq!(p.duration_seconds, 3.0);
        assert_eq!(p.delay_seconds, 0.0);
    }

    #[test]
    fn populate_writes_inline_styles() {
        let page = HeadlessPage::new();
        let container = page.insert_into_body(&Fragment::new("div").attr("id", "particles"));
        let mut rng = SmallRng::seed_from_u64(3);

        assert_eq!(field().populate_page(&page, &mut rng), Ok(15));
        let children = page.children(container);
        assert_eq!(children.len(), 15);
        let first = children[0];
        assert_eq!(page.class_name(first), "particle");
        assert!(page.style(first, "left").is_some_and(|v| v.ends_with('%')));
        assert!(page.style(first, "top").is_some_and(|v| v.ends_with('%')));
        assert!(
            page.style(first, "animation-duration")
                .is_some_and(|v| v.ends_with('s'))
        );
        assert!(page.style(first, "animation-delay").is_some());
    }

    #[test]
    fn populate_appends_on_repeat() {
        let page = HeadlessPage::new();
        let container = page.insert_into_body(&Fragment::new("div").attr("id", "particles"));
        let mut rng = SmallRng::seed_from_u64(3);
        field().populate(&page, &container, 4, &mut rng).unwrap();
        field().populate(&page, &container, 4, &mut rng).unwrap();
        assert_eq!(page.children(container).len(), 8);
    }

    #[test]
    fn missing_container_adds_nothing() {
        let page = HeadlessPage::new();
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(field().populate_page(&page, &mut rng), Ok(0));
    }
}
