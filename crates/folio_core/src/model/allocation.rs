//! Percentage allocation across the asset universe

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::asset::{AssetClass, NUM_ASSET_CLASSES};

/// Tolerance for the sum-to-100 invariant of a finalized allocation
pub const SUM_TOLERANCE: f64 = 0.1;

/// Percentages per asset class, positional in canonical order.
///
/// Serializes as a map from class id to percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<AssetClass, f64>", into = "BTreeMap<AssetClass, f64>")]
pub struct AllocationVector([f64; NUM_ASSET_CLASSES]);

impl AllocationVector {
    #[must_use]
    pub const fn new(percentages: [f64; NUM_ASSET_CLASSES]) -> Self {
        Self(percentages)
    }

    /// Build from a class -> percentage mapping. Missing classes are zero.
    #[must_use]
    pub fn from_map(map: &BTreeMap<AssetClass, f64>) -> Self {
        let mut values = [0.0; NUM_ASSET_CLASSES];
        for (class, value) in map {
            values[class.index()] = *value;
        }
        Self(values)
    }

    #[must_use]
    pub fn get(&self, class: AssetClass) -> f64 {
        self.0[class.index()]
    }

    #[must_use]
    pub fn as_array(&self) -> &[f64; NUM_ASSET_CLASSES] {
        &self.0
    }

    /// Iterate `(class, percentage)` in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        AssetClass::ALL.iter().map(|class| (*class, self.0[class.index()]))
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// True when no entry is negative and the sum is within tolerance of 100
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.0.iter().all(|v| v.is_finite() && *v >= 0.0)
            && (self.total() - 100.0).abs() <= SUM_TOLERANCE
    }

    /// Decimal weights summing to 1, or `None` when the total is not positive.
    ///
    /// Accepts percentages that do not already sum to 100.
    #[must_use]
    pub fn weights(&self) -> Option<[f64; NUM_ASSET_CLASSES]> {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        Some(self.0.map(|v| v / total))
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<AssetClass, f64> {
        self.iter().collect()
    }
}

impl Index<AssetClass> for AllocationVector {
    type Output = f64;

    fn index(&self, class: AssetClass) -> &f64 {
        &self.0[class.index()]
    }
}

impl From<BTreeMap<AssetClass, f64>> for AllocationVector {
    fn from(map: BTreeMap<AssetClass, f64>) -> Self {
        Self::from_map(&map)
    }
}

impl From<AllocationVector> for BTreeMap<AssetClass, f64> {
    fn from(allocation: AllocationVector) -> Self {
        allocation.to_map()
    }
}
