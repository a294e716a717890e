//! Computed-versus-fallback results
//!
//! Degenerate inputs and missing data are never errors in this crate. Each
//! recovery is reported through [`Outcome`] so callers can tell which path
//! produced the value without inspecting logs.

use serde::{Deserialize, Serialize};

use super::asset::AssetClass;

/// Why a documented fallback was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No raw allocation vectors were supplied
    NoPredictions,
    /// Combined prediction collapsed (sum too small or mostly zeros)
    DegenerateEnsemble { sum: f64, zero_count: usize },
    /// An external predictor failed
    PredictorFailed { message: String },
    /// Historical retrieval failed and a synthetic series was generated
    SyntheticSeries { class: AssetClass },
    /// None of the requested classes had historical data
    NoHistoricalData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed { value: T },
    FellBack { value: T, reason: FallbackReason },
}

impl<T> Outcome<T> {
    pub fn computed(value: T) -> Self {
        Outcome::Computed { value }
    }

    pub fn fell_back(value: T, reason: FallbackReason) -> Self {
        Outcome::FellBack { value, reason }
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Outcome::Computed { value } | Outcome::FellBack { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Computed { value } | Outcome::FellBack { value, .. } => value,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::FellBack { .. })
    }

    #[must_use]
    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Outcome::Computed { .. } => None,
            Outcome::FellBack { reason, .. } => Some(reason),
        }
    }

    /// Transform the carried value, keeping the path taken
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Computed { value } => Outcome::Computed { value: f(value) },
            Outcome::FellBack { value, reason } => Outcome::FellBack {
                value: f(value),
                reason,
            },
        }
    }
}
