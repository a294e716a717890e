//! Historical replay of a fixed allocation
//!
//! The allocation is held constant: each month the portfolio earns the
//! weighted sum of its classes' returns, then receives the contribution.

use std::sync::Arc;

use jiff::ToSpan;
use jiff::civil::Date;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::context::EngineContext;
use crate::error::{Result, ValidationError};
use crate::model::{
    AllocationVector, AssetClass, BacktestResult, BenchmarkComparison, FallbackReason,
    LookbackWindow, NUM_ASSET_CLASSES, Outcome,
};
use crate::monte_carlo::return_distribution;
use crate::returns::{self, BlendedSeries, ReturnSeries, WeightedSeries};
use crate::stats::{finite_or, max_drawdown_pct, safe_div, sample_std_dev};
use crate::validation;

/// Classes replayed on their own next to the portfolio
pub const BENCHMARK_CLASSES: [AssetClass; 3] = [
    AssetClass::FixedIncome,
    AssetClass::DomesticEquity,
    AssetClass::InternationalEquity,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// Percentages per class; rescaled to weights summing to 1
    pub allocation: AllocationVector,
    pub initial_capital: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default)]
    pub window: LookbackWindow,
}

pub struct BacktestEngine {
    context: Arc<EngineContext>,
}

impl BacktestEngine {
    pub fn new(context: Arc<EngineContext>) -> Self {
        Self { context }
    }

    fn validate(&self, request: &BacktestRequest) -> std::result::Result<[f64; NUM_ASSET_CLASSES], ValidationError> {
        let limits = &self.context.config.limits;
        validation::validate_allocation(&request.allocation)?;
        validation::validate_initial_capital(request.initial_capital, limits)?;
        validation::validate_monthly_contribution(request.monthly_contribution, limits)?;
        request.allocation.weights().ok_or_else(|| {
            ValidationError::new("allocation", "Allocation must have a positive total")
        })
    }

    /// Replay `request.allocation` over `request.window`.
    ///
    /// Classes whose history could not be retrieved are replayed on synthetic
    /// returns; when none could be retrieved the whole portfolio follows the
    /// configured synthetic walk.
    pub fn run(&self, request: &BacktestRequest) -> Result<Outcome<BacktestResult>> {
        let weights = self.validate(request)?;
        tracing::info!(
            window = %request.window,
            initial_capital = request.initial_capital,
            monthly_contribution = request.monthly_contribution,
            "running backtest"
        );

        let min_weight = self.context.config.min_class_weight;
        let mut real: Vec<(f64, Arc<ReturnSeries>)> = Vec::new();
        let mut synthetic: Vec<(f64, Arc<ReturnSeries>)> = Vec::new();
        for class in AssetClass::ALL {
            let weight = weights[class.index()];
            if weight <= min_weight {
                continue;
            }
            match self.context.returns.series(class, request.window) {
                Outcome::Computed { value } => real.push((weight, value)),
                Outcome::FellBack { value, .. } => synthetic.push((weight, value)),
            }
        }

        if real.is_empty() {
            tracing::warn!(window = %request.window, "no historical data, using synthetic walk");
            let blended = self.synthetic_walk(request.window, returns::current_month())?;
            let result = self.summarize(&blended, request);
            return Ok(Outcome::fell_back(result, FallbackReason::NoHistoricalData));
        }

        // Real series come first so the anchor is the first class with history
        let parts: Vec<WeightedSeries<'_>> = real
            .iter()
            .chain(synthetic.iter())
            .map(|(weight, series)| WeightedSeries {
                weight: *weight,
                series: series.as_ref(),
            })
            .collect();

        let Some(blended) = returns::blend(&parts) else {
            let blended = self.synthetic_walk(request.window, returns::current_month())?;
            let result = self.summarize(&blended, request);
            return Ok(Outcome::fell_back(result, FallbackReason::NoHistoricalData));
        };
        tracing::debug!(
            periods = blended.returns.len(),
            anchor = %parts[0].series.class(),
            "aligned class returns"
        );

        let result = self.summarize(&blended, request);
        Ok(match synthetic.first() {
            Some((_, series)) => Outcome::fell_back(
                result,
                FallbackReason::SyntheticSeries {
                    class: series.class(),
                },
            ),
            None => Outcome::computed(result),
        })
    }

    /// Backtest of the allocation alongside 100% fixed income, domestic and international equity
    pub fn compare_with_benchmarks(
        &self,
        request: &BacktestRequest,
    ) -> Result<Outcome<BenchmarkComparison>> {
        let portfolio = self.run(request)?;
        let mut reason = portfolio.fallback_reason().cloned();

        let mut benchmarks = Vec::with_capacity(BENCHMARK_CLASSES.len());
        for class in BENCHMARK_CLASSES {
            let mut percentages = [0.0; NUM_ASSET_CLASSES];
            percentages[class.index()] = 100.0;
            let benchmark = self.run(&BacktestRequest {
                allocation: AllocationVector::new(percentages),
                ..request.clone()
            })?;
            if reason.is_none() {
                reason = benchmark.fallback_reason().cloned();
            }
            benchmarks.push((
                format!("100% {}", class.display_name()),
                benchmark.into_value(),
            ));
        }

        let comparison = BenchmarkComparison {
            portfolio: portfolio.into_value(),
            benchmarks,
        };
        Ok(match reason {
            Some(reason) => Outcome::fell_back(comparison, reason),
            None => Outcome::computed(comparison),
        })
    }

    fn synthetic_walk(&self, window: LookbackWindow, end: Date) -> Result<BlendedSeries> {
        let dist = return_distribution(&self.context.config.synthetic_walk)?;

        let periods = window.months();
        let start = end
            .first_of_month()
            .checked_sub(((periods - 1) as i64).months())
            .unwrap_or(end.first_of_month());
        let months = (0..periods)
            .filter_map(|i| start.checked_add((i as i64).months()).ok())
            .collect::<Vec<_>>();

        let mut rng = rand::rng();
        let returns = months.iter().map(|_| dist.sample(&mut rng)).collect();
        Ok(BlendedSeries { months, returns })
    }

    fn summarize(&self, blended: &BlendedSeries, request: &BacktestRequest) -> BacktestResult {
        summarize(
            blended,
            request.initial_capital,
            request.monthly_contribution,
            self.context.config.risk_free_rate,
        )
    }
}

/// Walk the portfolio over `blended` and derive its statistics
fn summarize(
    blended: &BlendedSeries,
    initial_capital: f64,
    monthly_contribution: f64,
    risk_free_rate: f64,
) -> BacktestResult {
    let period_returns = &blended.returns;
    let periods = period_returns.len();

    let mut wealth = initial_capital;
    let mut contributed = 0.0;
    let mut wealth_path = Vec::with_capacity(periods + 1);
    let mut contributions_path = Vec::with_capacity(periods + 1);
    wealth_path.push(wealth);
    contributions_path.push(contributed);
    for r in period_returns {
        wealth = finite_or(wealth * (1.0 + r) + monthly_contribution, 0.0);
        contributed += monthly_contribution;
        wealth_path.push(wealth);
        contributions_path.push(contributed);
    }

    let final_wealth = wealth;
    let total_invested = initial_capital + contributed;
    let total_return = safe_div(final_wealth - total_invested, total_invested, 0.0);

    let years = periods as f64 / 12.0;
    let annualized_return = if years > 0.0 && initial_capital > 0.0 && final_wealth > 0.0 {
        finite_or((final_wealth / initial_capital).powf(1.0 / years) - 1.0, 0.0)
    } else {
        0.0
    };
    let annualized_volatility = sample_std_dev(period_returns) * 12f64.sqrt();
    let sharpe_ratio = if annualized_volatility > 0.0 {
        safe_div(annualized_return - risk_free_rate, annualized_volatility, 0.0)
    } else {
        0.0
    };

    let best = period_returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let worst = period_returns.iter().copied().fold(f64::INFINITY, f64::min);

    BacktestResult {
        period_months: blended.months.clone(),
        period_returns: period_returns.clone(),
        max_drawdown_pct: max_drawdown_pct(&wealth_path),
        wealth_path,
        contributions_path,
        initial_capital,
        monthly_contribution,
        final_wealth,
        total_contributions: contributed,
        total_invested,
        total_return_pct: total_return * 100.0,
        annualized_return_pct: annualized_return * 100.0,
        annualized_volatility_pct: annualized_volatility * 100.0,
        sharpe_ratio,
        best_period_pct: finite_or(best * 100.0, 0.0),
        worst_period_pct: finite_or(worst * 100.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn constant_blend(value: f64, periods: usize) -> BlendedSeries {
        let start = date(2024, 1, 1);
        BlendedSeries {
            months: (0..periods)
                .map(|i| start.checked_add((i as i64).months()).unwrap())
                .collect(),
            returns: vec![value; periods],
        }
    }

    #[test]
    fn test_summarize_constant_growth() {
        let result = summarize(&constant_blend(0.01, 12), 10_000.0, 0.0, 0.1175);
        assert!((result.final_wealth - 10_000.0 * 1.01f64.powi(12)).abs() < 1e-6);
        assert_eq!(result.annualized_volatility_pct, 0.0);
        assert_eq!(result.sharpe_ratio, 0.0);
        assert_eq!(result.max_drawdown_pct, 0.0);
        assert_eq!(result.wealth_path.len(), 13);
        assert!((result.annualized_return_pct - (1.01f64.powi(12) - 1.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_tracks_contributions() {
        let result = summarize(&constant_blend(0.0, 24), 1_000.0, 100.0, 0.1175);
        assert_eq!(result.total_contributions, 2_400.0);
        assert_eq!(result.total_invested, 3_400.0);
        assert_eq!(result.final_wealth, 3_400.0);
        assert_eq!(result.total_return_pct, 0.0);
        assert_eq!(result.contributions_path.last(), Some(&2_400.0));
    }

    #[test]
    fn test_summarize_empty_series_is_finite() {
        let result = summarize(&constant_blend(0.0, 0), 1_000.0, 0.0, 0.1175);
        assert_eq!(result.final_wealth, 1_000.0);
        assert_eq!(result.annualized_return_pct, 0.0);
        assert_eq!(result.best_period_pct, 0.0);
        assert_eq!(result.worst_period_pct, 0.0);
    }
}
