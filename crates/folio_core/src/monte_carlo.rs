//! Monte Carlo wealth projection
//!
//! Parameters are estimated from the allocation's blended history, then each
//! trial draws independent normal monthly returns for the whole horizon.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::EngineContext;
use crate::error::{EngineError, Result};
use crate::model::{
    AllocationVector, AssetClass, DetailedScenarios, FallbackReason, LookbackWindow,
    MonteCarloResult, Outcome, ScenarioPath,
};
use crate::returns::{self, ReturnSeries, WeightedSeries};
use crate::stats::{mean, percentile_sorted, population_std_dev, sample_std_dev, sorted_copy};
use crate::validation;

pub use crate::model::SimulationParameters;

const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub allocation: AllocationVector,
    pub initial_capital: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    pub horizon_years: u32,
    pub simulations: usize,
    /// Fixed seed for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub allocation: AllocationVector,
    pub initial_capital: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    pub horizon_years: u32,
}

impl From<&ProjectionRequest> for ScenarioRequest {
    fn from(request: &ProjectionRequest) -> Self {
        Self {
            allocation: request.allocation,
            initial_capital: request.initial_capital,
            monthly_contribution: request.monthly_contribution,
            horizon_years: request.horizon_years,
        }
    }
}

pub struct MonteCarloEngine {
    context: Arc<EngineContext>,
}

impl MonteCarloEngine {
    pub fn new(context: Arc<EngineContext>) -> Self {
        Self { context }
    }

    /// Mean and sample volatility of the allocation's blended monthly history.
    ///
    /// Only classes with real provider data take part, with weights rescaled
    /// over them. Without any, the configured defaults are returned. `window`
    /// defaults to the configured estimation window.
    pub fn estimate_parameters(
        &self,
        allocation: &AllocationVector,
        window: Option<LookbackWindow>,
    ) -> Outcome<SimulationParameters> {
        let config = &self.context.config;
        let defaults = config.default_parameters;
        let Some(weights) = allocation.weights() else {
            return Outcome::fell_back(defaults, FallbackReason::NoHistoricalData);
        };

        let window = window.unwrap_or(config.estimation_window);
        let mut available: Vec<(f64, Arc<ReturnSeries>)> = Vec::new();
        for class in AssetClass::ALL {
            let weight = weights[class.index()];
            if weight <= config.min_class_weight {
                continue;
            }
            match self.context.returns.historical(class, window) {
                Some(series) => available.push((weight, series)),
                None => tracing::debug!(%class, "class left out of parameter estimation"),
            }
        }

        let covered: f64 = available.iter().map(|(w, _)| w).sum();
        let parts: Vec<WeightedSeries<'_>> = available
            .iter()
            .map(|(weight, series)| WeightedSeries {
                weight: weight / covered,
                series: series.as_ref(),
            })
            .collect();

        match returns::blend(&parts) {
            Some(blended) if covered > 0.0 => {
                let params = SimulationParameters {
                    mean_monthly_return: mean(&blended.returns),
                    monthly_volatility: sample_std_dev(&blended.returns),
                };
                tracing::debug!(?params, periods = blended.returns.len(), "estimated parameters");
                Outcome::computed(params)
            }
            _ => {
                tracing::warn!(window = %window, "no historical data, using default parameters");
                Outcome::fell_back(defaults, FallbackReason::NoHistoricalData)
            }
        }
    }

    /// Run `request.simulations` independent trials and summarize terminal wealth
    pub fn simulate_scenarios(
        &self,
        request: &ProjectionRequest,
    ) -> Result<Outcome<MonteCarloResult>> {
        self.validate_projection(request)?;
        tracing::info!(
            horizon_years = request.horizon_years,
            simulations = request.simulations,
            initial_capital = request.initial_capital,
            "running monte carlo projection"
        );

        let estimate = self.estimate_parameters(&request.allocation, None);
        let result = run_trials(request, *estimate.value())?;
        Ok(estimate.map(|_| result))
    }

    /// Run trials with caller-supplied parameters instead of estimating them
    pub fn simulate_with_parameters(
        &self,
        request: &ProjectionRequest,
        parameters: SimulationParameters,
    ) -> Result<MonteCarloResult> {
        self.validate_projection(request)?;
        validation::validate_parameters(&parameters)?;
        run_trials(request, parameters)
    }

    /// Deterministic walks at mean + volatility, mean, and mean - volatility
    pub fn detailed_scenarios(&self, request: &ScenarioRequest) -> Result<Outcome<DetailedScenarios>> {
        let limits = &self.context.config.limits;
        validation::validate_allocation(&request.allocation)?;
        validation::validate_initial_capital(request.initial_capital, limits)?;
        validation::validate_monthly_contribution(request.monthly_contribution, limits)?;
        validation::validate_horizon(request.horizon_years, limits)?;

        let estimate = self.estimate_parameters(&request.allocation, None);
        validation::validate_parameters(estimate.value())?;
        Ok(estimate.map(|params| scenarios(request, params)))
    }

    fn validate_projection(&self, request: &ProjectionRequest) -> Result<()> {
        let limits = &self.context.config.limits;
        validation::validate_allocation(&request.allocation)?;
        validation::validate_initial_capital(request.initial_capital, limits)?;
        validation::validate_monthly_contribution(request.monthly_contribution, limits)?;
        validation::validate_horizon(request.horizon_years, limits)?;
        validation::validate_simulations(request.simulations, limits)?;
        Ok(())
    }
}

/// Normal distribution of monthly returns. Negative or non-finite parameters are rejected.
pub(crate) fn return_distribution(params: &SimulationParameters) -> Result<Normal<f64>> {
    let invalid = || EngineError::InvalidDistribution {
        distribution: "normal",
        mean: params.mean_monthly_return,
        std_dev: params.monthly_volatility,
    };
    validation::validate_parameters(params).map_err(|_| invalid())?;
    Normal::new(params.mean_monthly_return, params.monthly_volatility).map_err(|_| invalid())
}

fn run_trials(request: &ProjectionRequest, params: SimulationParameters) -> Result<MonteCarloResult> {
    let dist = return_distribution(&params)?;

    let months = request.horizon_years as usize * 12;
    let simulations = request.simulations;
    let seed = request.seed.unwrap_or_else(rand::random);
    let num_batches = simulations.div_ceil(MAX_BATCH_SIZE);

    let run_batch = |i: usize| -> Vec<f64> {
        let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
        let batch_size = if i == num_batches - 1 {
            simulations - i * MAX_BATCH_SIZE
        } else {
            MAX_BATCH_SIZE
        };

        (0..batch_size)
            .map(|_| {
                let mut wealth = request.initial_capital;
                for _ in 0..months {
                    wealth = wealth * (1.0 + dist.sample(&mut rng)) + request.monthly_contribution;
                }
                wealth
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let terminal: Vec<f64> = (0..num_batches).into_par_iter().flat_map(run_batch).collect();
    #[cfg(not(feature = "parallel"))]
    let terminal: Vec<f64> = (0..num_batches).flat_map(run_batch).collect();

    Ok(summarize_terminal(&terminal, request, params))
}

fn summarize_terminal(
    terminal: &[f64],
    request: &ProjectionRequest,
    parameters: SimulationParameters,
) -> MonteCarloResult {
    let sorted = sorted_copy(terminal);
    let n = sorted.len().max(1) as f64;
    let invested =
        request.initial_capital + request.monthly_contribution * (request.horizon_years as f64 * 12.0);

    let doubled = sorted
        .iter()
        .filter(|v| **v >= 2.0 * request.initial_capital)
        .count();
    let lost = sorted.iter().filter(|v| **v < invested).count();

    MonteCarloResult {
        simulations: terminal.len(),
        horizon_years: request.horizon_years,
        initial_capital: request.initial_capital,
        monthly_contribution: request.monthly_contribution,
        parameters,
        mean: mean(&sorted),
        median: percentile_sorted(&sorted, 50.0),
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        std_dev: population_std_dev(&sorted),
        percentile_10: percentile_sorted(&sorted, 10.0),
        percentile_25: percentile_sorted(&sorted, 25.0),
        percentile_75: percentile_sorted(&sorted, 75.0),
        percentile_90: percentile_sorted(&sorted, 90.0),
        probability_of_doubling_pct: doubled as f64 / n * 100.0,
        probability_of_loss_pct: lost as f64 / n * 100.0,
    }
}

fn scenarios(request: &ScenarioRequest, params: SimulationParameters) -> DetailedScenarios {
    let months = request.horizon_years as usize * 12;
    let mean = params.mean_monthly_return;
    let vol = params.monthly_volatility;

    DetailedScenarios {
        months: (0..=months).collect(),
        parameters: params,
        optimistic: compound(request, mean + vol, months),
        realistic: compound(request, mean, months),
        pessimistic: compound(request, mean - vol, months),
    }
}

/// Fixed-rate walk. Rates below -100% are treated as a total loss each month.
fn compound(request: &ScenarioRequest, monthly_return: f64, months: usize) -> ScenarioPath {
    let rate = monthly_return.max(-1.0);
    let mut wealth = request.initial_capital;
    let mut path = Vec::with_capacity(months + 1);
    path.push(wealth);
    for _ in 0..months {
        wealth = wealth * (1.0 + rate) + request.monthly_contribution;
        path.push(wealth);
    }

    ScenarioPath {
        monthly_return,
        wealth: path,
        final_value: wealth,
    }
}
