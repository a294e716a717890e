//! Combine raw allocation predictions into a presentable allocation
//!
//! Raw predictor outputs are six non-negative reals on an arbitrary scale.
//! The combiner blends them with fixed weights, rejects degenerate blends in
//! favour of a per-profile reference allocation, and otherwise normalizes to
//! percentages with a small minimum for every held class.

use std::sync::Arc;

use crate::error::{PredictionError, ValidationError};
use crate::model::{AllocationVector, FallbackReason, NUM_ASSET_CLASSES, Outcome, RiskProfile};
use crate::validation;

/// Combined sum below which a prediction is considered degenerate
pub const MIN_COMBINED_SUM: f64 = 0.5;
/// Entries at or below this value count as zero
pub const ZERO_THRESHOLD: f64 = 0.01;
/// Degenerate when at least this many entries are zero
pub const MAX_ZERO_ENTRIES: usize = 4;
/// Smallest percentage a held class is shown with
pub const MIN_HELD_PERCENTAGE: f64 = 0.5;

/// Reference allocation for each risk profile
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTable {
    vectors: [AllocationVector; RiskProfile::ALL.len()],
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self {
            vectors: [
                AllocationVector::new([50.0, 20.0, 15.0, 10.0, 3.0, 2.0]),
                AllocationVector::new([35.0, 30.0, 20.0, 10.0, 3.0, 2.0]),
                AllocationVector::new([25.0, 35.0, 25.0, 10.0, 3.0, 2.0]),
                AllocationVector::new([15.0, 40.0, 30.0, 10.0, 3.0, 2.0]),
                AllocationVector::new([10.0, 40.0, 35.0, 10.0, 3.0, 2.0]),
            ],
        }
    }
}

impl FallbackTable {
    #[must_use]
    pub fn get(&self, profile: RiskProfile) -> AllocationVector {
        self.vectors[profile.index()]
    }

    /// Replace one profile's reference vector. It must be a finalized allocation.
    pub fn with_vector(
        mut self,
        profile: RiskProfile,
        vector: AllocationVector,
    ) -> Result<Self, ValidationError> {
        if !vector.is_finalized() {
            return Err(ValidationError::new(
                profile.label(),
                format!(
                    "Fallback allocation must be non-negative and sum to 100, got {}",
                    vector.total()
                ),
            ));
        }
        self.vectors[profile.index()] = vector;
        Ok(self)
    }
}

/// One predictor's output and its ensemble weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawAllocation {
    pub values: [f64; NUM_ASSET_CLASSES],
    pub weight: f64,
}

impl RawAllocation {
    #[must_use]
    pub const fn new(values: [f64; NUM_ASSET_CLASSES], weight: f64) -> Self {
        Self { values, weight }
    }
}

/// Bring entries strictly between 0 and the minimum up to the minimum, then rescale to 100.
///
/// A vector already summing to 100 with no small positive entry is returned unchanged.
#[must_use]
pub fn floor_and_renormalize(values: [f64; NUM_ASSET_CLASSES]) -> [f64; NUM_ASSET_CLASSES] {
    let floored = values.map(|v| {
        if v > 0.0 && v < MIN_HELD_PERCENTAGE {
            MIN_HELD_PERCENTAGE
        } else {
            v
        }
    });

    let total: f64 = floored.iter().sum();
    if total <= 0.0 || !total.is_finite() || total == 100.0 {
        return floored;
    }
    floored.map(|v| v * 100.0 / total)
}

/// Weighted blend of raw predictions with per-profile fallback
#[derive(Debug, Clone, Default)]
pub struct EnsembleCombiner {
    fallback: FallbackTable,
}

impl EnsembleCombiner {
    #[must_use]
    pub fn new(fallback: FallbackTable) -> Self {
        Self { fallback }
    }

    #[must_use]
    pub fn fallback_table(&self) -> &FallbackTable {
        &self.fallback
    }

    /// Combine raw predictions for `profile`.
    ///
    /// Never fails: an empty input or a degenerate blend yields the profile's
    /// reference allocation, reported as a fallback.
    pub fn combine(&self, raw: &[RawAllocation], profile: RiskProfile) -> Outcome<AllocationVector> {
        if raw.is_empty() {
            tracing::warn!(%profile, "no raw predictions, using profile allocation");
            return Outcome::fell_back(self.fallback.get(profile), FallbackReason::NoPredictions);
        }

        let mut combined = [0.0; NUM_ASSET_CLASSES];
        for prediction in raw {
            for (slot, value) in combined.iter_mut().zip(prediction.values) {
                let value = if value.is_finite() { value } else { 0.0 };
                *slot += prediction.weight * value;
            }
        }
        let clipped = combined.map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 });
        tracing::debug!(?combined, ?clipped, "combined raw predictions");

        let sum: f64 = clipped.iter().sum();
        let zero_count = clipped.iter().filter(|v| **v <= ZERO_THRESHOLD).count();
        if sum < MIN_COMBINED_SUM || zero_count >= MAX_ZERO_ENTRIES {
            tracing::warn!(
                %profile,
                sum,
                zero_count,
                "degenerate ensemble prediction, using profile allocation"
            );
            return Outcome::fell_back(
                self.fallback.get(profile),
                FallbackReason::DegenerateEnsemble { sum, zero_count },
            );
        }

        let normalized = clipped.map(|v| v / sum * 100.0);
        let finalized = floor_and_renormalize(normalized);
        tracing::debug!(?finalized, "finalized allocation");
        Outcome::computed(AllocationVector::new(finalized))
    }
}

/// External model mapping investor features to six raw allocation values
pub trait AllocationPredictor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &[f64]) -> Result<[f64; NUM_ASSET_CLASSES], PredictionError>;
}

/// Fixed set of predictors with fixed weights feeding an [`EnsembleCombiner`]
pub struct WeightedEnsemble {
    members: Vec<(Arc<dyn AllocationPredictor>, f64)>,
    combiner: EnsembleCombiner,
}

impl WeightedEnsemble {
    /// Weights must be finite, non-negative and sum to 1
    pub fn new(
        members: Vec<(Arc<dyn AllocationPredictor>, f64)>,
        combiner: EnsembleCombiner,
    ) -> Result<Self, ValidationError> {
        let weights: Vec<f64> = members.iter().map(|(_, w)| *w).collect();
        validation::validate_ensemble_weights(&weights)?;

        Ok(Self { members, combiner })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Run every predictor on `features` and combine the results.
    ///
    /// The first predictor failure short-circuits to the profile allocation.
    pub fn allocate(&self, features: &[f64], profile: RiskProfile) -> Outcome<AllocationVector> {
        let mut raw = Vec::with_capacity(self.members.len());
        for (predictor, weight) in &self.members {
            match predictor.predict(features) {
                Ok(values) => raw.push(RawAllocation::new(values, *weight)),
                Err(e) => {
                    tracing::warn!(predictor = predictor.name(), error = %e, "predictor failed");
                    return Outcome::fell_back(
                        self.combiner.fallback_table().get(profile),
                        FallbackReason::PredictorFailed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }
        self.combiner.combine(&raw, profile)
    }
}
