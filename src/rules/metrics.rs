//! Rule metrics

use std::fmt;

use crate::rules::Rule;

/// Metric used to threshold generated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleMetric {
    /// Support of antecedents ∪ consequents
    Support,

    /// Conditional probability of the consequents given the antecedents
    Confidence,

    /// Confidence relative to the consequent support
    Lift,

    /// Observed minus expected support under independence
    Leverage,

    /// Ratio of expected to observed misprediction rate
    Conviction,
}

impl RuleMetric {
    /// Value of this metric for `rule`.
    pub fn value(self, rule: &Rule) -> f64 {
        match self {
            Self::Support => rule.support(),
            Self::Confidence => rule.confidence(),
            Self::Lift => rule.lift(),
            Self::Leverage => rule.leverage(),
            Self::Conviction => rule.conviction(),
        }
    }

    /// Lowercase metric name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Confidence => "confidence",
            Self::Lift => "lift",
            Self::Leverage => "leverage",
            Self::Conviction => "conviction",
        }
    }
}

impl fmt::Display for RuleMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
