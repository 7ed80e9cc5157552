//! Resolution configuration.

use crate::rule::{Combine, DescMatch, EvalConfig};

/// Configuration parameters for a resolution pass.
///
/// # Examples
///
/// ```
/// use modorder::resolve::ResolveConfig;
/// use modorder::rule::DescMatch;
///
/// let config = ResolveConfig::default()
///     .with_desc_match(DescMatch::Exact)
///     .with_placement_weight(10);
/// assert_eq!(config.placement_weight, 10);
/// ```
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Predicate evaluation settings.
    pub eval: EvalConfig,
    /// Magnitude one NEARSTART/NEAREND rule adds to its subject's soft
    /// placement weight.
    pub placement_weight: i64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            eval: EvalConfig::default(),
            placement_weight: 1,
        }
    }
}

impl ResolveConfig {
    /// Sets the `DESC` predicate matching mode.
    pub fn with_desc_match(mut self, mode: DescMatch) -> Self {
        self.eval.desc_match = mode;
        self
    }

    /// Sets the predicate combination logic.
    pub fn with_combine(mut self, combine: Combine) -> Self {
        self.eval.combine = combine;
        self
    }

    /// Sets the NEARSTART/NEAREND placement magnitude.
    pub fn with_placement_weight(mut self, weight: i64) -> Self {
        self.placement_weight = weight;
        self
    }
}
