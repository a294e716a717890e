use std::fmt;

use serde::{Deserialize, Serialize};

/// Investor risk profile as produced by the external classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Balanced,
    Growth,
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 5] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Balanced,
        RiskProfile::Growth,
        RiskProfile::Aggressive,
    ];

    /// Position of this profile in per-profile tables
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Balanced => "Balanced",
            Self::Growth => "Growth",
            Self::Aggressive => "Aggressive",
        }
    }

    /// Case-insensitive label lookup
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label))
    }

    /// Resolve a classifier label, falling back to `Moderate` for anything unrecognized
    #[must_use]
    pub fn resolve(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }

    /// Map a normalized risk score in `[0, 1]` onto a profile
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            Self::Conservative
        } else if score < 0.5 {
            Self::Moderate
        } else if score < 0.7 {
            Self::Balanced
        } else if score < 0.85 {
            Self::Growth
        } else {
            Self::Aggressive
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
