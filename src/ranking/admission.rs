//! Heading admission: drop short or deeply nested titles before scoring
use crate::config::RankingConfig;
use crate::document::Heading;

/// Pure predicate deciding which headings are worth scoring at all
#[derive(Debug, Clone, Copy)]
pub struct AdmissionFilter {
    /// Minimum whitespace-delimited tokens in the title
    pub min_title_tokens: usize,
    /// Deepest heading level admitted
    pub max_level: u32,
}

impl AdmissionFilter {
    pub fn new(min_title_tokens: usize, max_level: u32) -> Self {
        Self {
            min_title_tokens,
            max_level,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.min_title_tokens, config.max_heading_level)
    }

    pub fn admits(&self, heading: &Heading) -> bool {
        heading.token_count() >= self.min_title_tokens && heading.level <= self.max_level
    }

    /// Admitted headings, in input order
    pub fn filter<'a>(&self, headings: &'a [Heading]) -> Vec<&'a Heading> {
        headings.iter().filter(|h| self.admits(h)).collect()
    }
}

impl Default for AdmissionFilter {
    fn default() -> Self {
        Self::from_config(&RankingConfig::default())
    }
}

/// Admission with the default thresholds (>= 4 title tokens, level <= 2)
pub fn admit(heading: &Heading) -> bool {
    AdmissionFilter::default().admits(heading)
}
