//! Build configuration.

use std::collections::HashSet;

use crate::Error;

/// Buffer growth for [`CompressedPostings`](crate::CompressedPostings).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthPolicy {
    /// Capacity of a freshly created postings buffer.
    pub initial_capacity: usize,
    /// Factor applied to the capacity when the buffer is full.
    ///
    /// Must be finite and greater than 1.0.
    pub expansion_rate: f64,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            expansion_rate: 2.0,
        }
    }
}

impl GrowthPolicy {
    /// Check that the policy makes progress when growing.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.expansion_rate.is_finite() || self.expansion_rate <= 1.0 {
            return Err(Error::InvalidConfig(
                "expansion_rate must be finite and greater than 1.0",
            ));
        }
        Ok(())
    }

    /// Capacity after one growth step from `current`.
    ///
    /// Always at least `current + 1`, so a zero initial capacity still grows.
    pub fn next_capacity(&self, current: usize) -> usize {
        // float -> int casts saturate
        let scaled = (current as f64 * self.expansion_rate).ceil() as usize;
        scaled.max(current.saturating_add(1))
    }
}

/// Configuration for building an index.
///
/// Whether ids are numeric (and their width and signedness) is not a field:
/// it is the postings type of the index, e.g. [`NumericIndex<u32>`] or
/// [`KeyedIndex<String>`].
///
/// [`NumericIndex<u32>`]: crate::NumericIndex
/// [`KeyedIndex<String>`]: crate::KeyedIndex
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexConfig {
    /// Growth of numeric postings buffers.
    pub growth: GrowthPolicy,
    /// Tokens that are never indexed.
    pub excluded_terms: HashSet<String>,
}

impl IndexConfig {
    /// Default configuration: no exclusions, capacity 10, growth 2x.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the growth policy.
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Add tokens to the exclusion set.
    pub fn with_excluded_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Whether `term` is skipped during build.
    pub fn is_excluded(&self, term: &str) -> bool {
        self.excluded_terms.contains(term)
    }

    /// Validate every part of the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        self.growth.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_growth_doubles() {
        let g = GrowthPolicy::default();
        assert_eq!(g.initial_capacity, 10);
        assert_eq!(g.next_capacity(10), 20);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn fractional_rate_rounds_up_and_always_progresses() {
        let g = GrowthPolicy {
            initial_capacity: 0,
            expansion_rate: 1.5,
        };
        assert_eq!(g.next_capacity(0), 1);
        assert_eq!(g.next_capacity(1), 2);
        assert_eq!(g.next_capacity(3), 5);
        assert_eq!(g.next_capacity(usize::MAX), usize::MAX);
    }

    #[test]
    fn rejects_rates_that_do_not_grow() {
        for rate in [1.0, 0.5, -2.0, f64::NAN, f64::INFINITY] {
            let cfg = IndexConfig::new().with_growth(GrowthPolicy {
                initial_capacity: 4,
                expansion_rate: rate,
            });
            assert!(
                matches!(cfg.validate(), Err(Error::InvalidConfig(_))),
                "rate {rate} accepted"
            );
        }
    }

    #[test]
    fn exclusions_accumulate() {
        let cfg = IndexConfig::new()
            .with_excluded_terms(["the", "a"])
            .with_excluded_terms(vec![String::from("der")]);
        assert!(cfg.is_excluded("the"));
        assert!(cfg.is_excluded("der"));
        assert!(!cfg.is_excluded("cat"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_fills_defaults() {
        let cfg: IndexConfig =
            serde_json::from_str(r#"{"excluded_terms": ["und"], "growth": {"expansion_rate": 3.0}}"#)
                .unwrap();
        assert!(cfg.is_excluded("und"));
        assert_eq!(cfg.growth.initial_capacity, 10);
        assert_eq!(cfg.growth.expansion_rate, 3.0);
    }
}
