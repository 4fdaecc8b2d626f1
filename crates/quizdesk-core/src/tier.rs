//! Qualitative feedback tier for a score. Display only.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultTier {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ResultTier {
    pub const EXCELLENT_FROM: f64 = 90.0;
    pub const GOOD_FROM: f64 = 70.0;

    /// Map a percentage to its tier. Lower band bounds are inclusive; NaN
    /// falls into the lowest tier.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::EXCELLENT_FROM {
            ResultTier::Excellent
        } else if score >= Self::GOOD_FROM {
            ResultTier::Good
        } else {
            ResultTier::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResultTier::Excellent => "excellent",
            ResultTier::Good => "good",
            ResultTier::NeedsImprovement => "needs improvement",
        }
    }

    /// Short encouragement shown under the score.
    pub fn message(self) -> &'static str {
        match self {
            ResultTier::Excellent => "Excellent!",
            ResultTier::Good => "Good job!",
            ResultTier::NeedsImprovement => "Keep studying!",
        }
    }
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render a score with one decimal, e.g. `87.5%`.
pub fn format_score(score: f64) -> String {
    format!("{score:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        let cases = [
            (89.9, ResultTier::Good),
            (90.0, ResultTier::Excellent),
            (69.9, ResultTier::NeedsImprovement),
            (70.0, ResultTier::Good),
            (100.0, ResultTier::Excellent),
            (0.0, ResultTier::NeedsImprovement),
        ];
        for (score, tier) in cases {
            assert_eq!(ResultTier::from_score(score), tier, "score {score}");
        }
    }

    #[test]
    fn total_over_odd_inputs() {
        assert_eq!(ResultTier::from_score(f64::NAN), ResultTier::NeedsImprovement);
        assert_eq!(ResultTier::from_score(-5.0), ResultTier::NeedsImprovement);
        assert_eq!(ResultTier::from_score(150.0), ResultTier::Excellent);
    }

    #[test]
    fn labels() {
        assert_eq!(ResultTier::NeedsImprovement.to_string(), "needs improvement");
        assert_eq!(format_score(87.46), "87.5%");
        assert_eq!(format_score(100.0), "100.0%");
    }
}
