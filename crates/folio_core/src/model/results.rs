//! Engine output types
//!
//! All rates expressed as `*_pct` fields are percentages (12.5 means 12.5%).
//! Each result offers a `rounded()` view for response bodies: two decimals
//! for currency and percentages, four for ratios.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::stats::{round_currency, round_ratio};

/// Historical replay of a fixed allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Month label of each return period (one per step of the walk)
    pub period_months: Vec<Date>,
    /// Portfolio return of each period, as a fraction
    pub period_returns: Vec<f64>,
    /// Wealth before the first period followed by wealth after each period
    pub wealth_path: Vec<f64>,
    /// Cumulative external contributions aligned with `wealth_path`
    pub contributions_path: Vec<f64>,
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub final_wealth: f64,
    /// External contributions only
    pub total_contributions: f64,
    /// Initial capital plus external contributions
    pub total_invested: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline, zero or negative
    pub max_drawdown_pct: f64,
    pub best_period_pct: f64,
    pub worst_period_pct: f64,
}

impl BacktestResult {
    #[must_use]
    pub fn periods(&self) -> usize {
        self.period_returns.len()
    }

    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            period_months: self.period_months.clone(),
            period_returns: self.period_returns.iter().copied().map(round_ratio).collect(),
            wealth_path: self.wealth_path.iter().copied().map(round_currency).collect(),
            contributions_path: self
                .contributions_path
                .iter()
                .copied()
                .map(round_currency)
                .collect(),
            initial_capital: round_currency(self.initial_capital),
            monthly_contribution: round_currency(self.monthly_contribution),
            final_wealth: round_currency(self.final_wealth),
            total_contributions: round_currency(self.total_contributions),
            total_invested: round_currency(self.total_invested),
            total_return_pct: round_currency(self.total_return_pct),
            annualized_return_pct: round_currency(self.annualized_return_pct),
            annualized_volatility_pct: round_currency(self.annualized_volatility_pct),
            sharpe_ratio: round_ratio(self.sharpe_ratio),
            max_drawdown_pct: round_currency(self.max_drawdown_pct),
            best_period_pct: round_currency(self.best_period_pct),
            worst_period_pct: round_currency(self.worst_period_pct),
        }
    }
}

/// Backtest of an allocation next to single-class benchmarks over the same window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub portfolio: BacktestResult,
    pub benchmarks: Vec<(String, BacktestResult)>,
}

/// Mean and volatility of monthly portfolio returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub mean_monthly_return: f64,
    pub monthly_volatility: f64,
}

/// Distribution of terminal wealth across Monte Carlo trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub simulations: usize,
    pub horizon_years: u32,
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub parameters: SimulationParameters,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub percentile_10: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    pub percentile_90: f64,
    /// Share of trials ending at or above twice the initial capital
    pub probability_of_doubling_pct: f64,
    /// Share of trials ending below the total capital put in
    pub probability_of_loss_pct: f64,
}

impl MonteCarloResult {
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            parameters: SimulationParameters {
                mean_monthly_return: round_ratio(self.parameters.mean_monthly_return),
                monthly_volatility: round_ratio(self.parameters.monthly_volatility),
            },
            initial_capital: round_currency(self.initial_capital),
            monthly_contribution: round_currency(self.monthly_contribution),
            mean: round_currency(self.mean),
            median: round_currency(self.median),
            min: round_currency(self.min),
            max: round_currency(self.max),
            std_dev: round_currency(self.std_dev),
            percentile_10: round_currency(self.percentile_10),
            percentile_25: round_currency(self.percentile_25),
            percentile_75: round_currency(self.percentile_75),
            percentile_90: round_currency(self.percentile_90),
            probability_of_doubling_pct: round_currency(self.probability_of_doubling_pct),
            probability_of_loss_pct: round_currency(self.probability_of_loss_pct),
            ..self.clone()
        }
    }
}

/// One deterministic compounding walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPath {
    /// Fixed monthly return applied every period
    pub monthly_return: f64,
    /// Wealth at month 0 through month `horizon * 12`
    pub wealth: Vec<f64>,
    pub final_value: f64,
}

impl ScenarioPath {
    fn rounded(&self) -> Self {
        Self {
            monthly_return: round_ratio(self.monthly_return),
            wealth: self.wealth.iter().copied().map(round_currency).collect(),
            final_value: round_currency(self.final_value),
        }
    }
}

/// Optimistic / realistic / pessimistic projections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedScenarios {
    pub months: Vec<usize>,
    pub parameters: SimulationParameters,
    pub optimistic: ScenarioPath,
    pub realistic: ScenarioPath,
    pub pessimistic: ScenarioPath,
}

impl DetailedScenarios {
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            months: self.months.clone(),
            parameters: SimulationParameters {
                mean_monthly_return: round_ratio(self.parameters.mean_monthly_return),
                monthly_volatility: round_ratio(self.parameters.monthly_volatility),
            },
            optimistic: self.optimistic.rounded(),
            realistic: self.realistic.rounded(),
            pessimistic: self.pessimistic.rounded(),
        }
    }
}
