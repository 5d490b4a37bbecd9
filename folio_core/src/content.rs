// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Portfolio data records.
//!
//! The page content is supplied from outside as a [`Portfolio`], usually
//! deserialized from JSON. Records are read-only once loaded.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// One publication.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Paper title.
    pub title: String,
    /// Journal or conference. Also read from `journal`.
    #[serde(alias = "journal")]
    pub venue: String,
    /// Publication year.
    pub year: u16,
    /// Filter category, matched exactly against the filter buttons.
    pub category: String,
    /// Topic tags, shown in order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Link to the paper.
    pub url: String,
}

impl PublicationRecord {
    /// Returns the `venue | year` line shown under the title.
    #[must_use]
    pub fn meta_line(&self) -> String {
        alloc::format!("{} | {}", self.venue, self.year)
    }
}

/// All externally supplied page content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Publications, in display order.
    #[serde(default)]
    pub publications: Vec<PublicationRecord>,
    /// Skill names, in display order.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Portfolio {
    /// Returns the distinct publication categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for p in &self.publications {
            if !out.contains(&p.category.as_str()) {
                out.push(&p.category);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "publications": [
            {
                "title": "MEA-NAP",
                "journal": "Cell Reports Methods",
                "year": 2024,
                "category": "neuroscience",
                "tags": ["Neuroscience", "Organoids"],
                "url": "https://doi.org/10.1016/j.crmeth.2024.10090"
            },
            {
                "title": "Bayesian Network",
                "venue": "J Trauma",
                "year": 2023,
                "category": "clinical",
                "url": "https://doi.org/10.1097/TA.0000000000003935"
            }
        ],
        "skills": ["Python", "R"]
    }"#;

    #[test]
    fn accepts_journal_or_venue() {
        let portfolio: Portfolio = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(portfolio.publications[0].venue, "Cell Reports Methods");
        assert_eq!(portfolio.publications[1].venue, "J Trauma");
        assert!(portfolio.publications[1].tags.is_empty());
        assert_eq!(portfolio.publications[0].meta_line(), "Cell Reports Methods | 2024");
        assert_eq!(portfolio.skills, ["Python", "R"]);
        assert_eq!(portfolio.categories(), ["neuroscience", "clinical"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let portfolio: Portfolio = serde_json::from_str("{}").unwrap();
        assert_eq!(portfolio, Portfolio::default());
    }
}
