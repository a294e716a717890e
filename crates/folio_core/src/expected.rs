//! Forward-looking metrics from the reference assumptions alone

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AllocationVector, AssetClass, AssetUniverse};
use crate::stats::{round_currency, round_ratio, safe_div};

/// Amount projected forward in [`ExpectedMetrics::projected_value`]
pub const PROJECTION_BASE: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedMetrics {
    /// Allocation-weighted annual return, as a fraction
    pub expected_return: f64,
    /// Allocation-weighted annual volatility, as a fraction
    pub expected_risk: f64,
    pub sharpe_ratio: f64,
    pub horizon_years: u32,
    /// [`PROJECTION_BASE`] compounded at the expected return over the horizon
    pub projected_value: f64,
}

impl ExpectedMetrics {
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            expected_return: round_ratio(self.expected_return),
            expected_risk: round_ratio(self.expected_risk),
            sharpe_ratio: round_ratio(self.sharpe_ratio),
            horizon_years: self.horizon_years,
            projected_value: round_currency(self.projected_value),
        }
    }
}

/// Weighted reference return and risk of an allocation.
///
/// Risk is a plain weighted average of class volatilities; correlations are
/// ignored. A zero-total allocation yields all zeros.
#[must_use]
pub fn expected_metrics(
    allocation: &AllocationVector,
    horizon_years: u32,
    risk_free_rate: f64,
) -> ExpectedMetrics {
    let (expected_return, expected_risk) = match allocation.weights() {
        Some(weights) => AssetUniverse::classes()
            .iter()
            .fold((0.0, 0.0), |(ret, risk), class| {
                let reference = AssetUniverse::reference(*class);
                let w = weights[class.index()];
                (
                    ret + w * reference.annual_return,
                    risk + w * reference.annual_volatility,
                )
            }),
        None => (0.0, 0.0),
    };

    let sharpe_ratio = if expected_risk > 0.0 {
        safe_div(expected_return - risk_free_rate, expected_risk, 0.0)
    } else {
        0.0
    };

    ExpectedMetrics {
        expected_return,
        expected_risk,
        sharpe_ratio,
        horizon_years,
        projected_value: PROJECTION_BASE * (1.0 + expected_return).powi(horizon_years as i32),
    }
}

/// Suggested products for every class the allocation holds
#[must_use]
pub fn suggested_products(
    allocation: &AllocationVector,
) -> BTreeMap<AssetClass, &'static [&'static str]> {
    allocation
        .iter()
        .filter(|(_, pct)| *pct > 0.0)
        .map(|(class, _)| (class, AssetUniverse::suggested_products(class)))
        .collect()
}
