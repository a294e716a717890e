//! Tests for the Monte Carlo engine
//!
//! These tests verify that:
//! - Parameters come from blended history, or defaults without history
//! - Terminal-wealth statistics are ordered and reproducible under a seed
//! - Deterministic scenarios keep pessimistic <= realistic <= optimistic
//! - Negative or non-finite parameters are rejected before any trial runs

use std::sync::Arc;

use super::{START, constant_provider, context_with, relaxed_context};
use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::model::{AllocationVector, AssetClass, FallbackReason, LookbackWindow};
use crate::monte_carlo::{MonteCarloEngine, ProjectionRequest, ScenarioRequest, SimulationParameters};
use crate::returns::{InMemoryProvider, OfflineProvider};
use crate::stats::sample_std_dev;

const CONSERVATIVE: [f64; 6] = [50.0, 20.0, 15.0, 10.0, 3.0, 2.0];

fn projection(simulations: usize, horizon_years: u32) -> ProjectionRequest {
    ProjectionRequest {
        allocation: AllocationVector::new(CONSERVATIVE),
        initial_capital: 10_000.0,
        monthly_contribution: 500.0,
        horizon_years,
        simulations,
        seed: Some(7),
    }
}

#[test]
fn test_estimate_uses_blended_history() {
    let provider = InMemoryProvider::new()
        .with_values(AssetClass::FixedIncome, START, &[0.02, 0.0, 0.02, 0.0])
        .with_values(AssetClass::DomesticEquity, START, &[0.0, 0.02, 0.0, 0.02]);
    let engine = MonteCarloEngine::new(context_with(Arc::new(provider)));

    let allocation = AllocationVector::new([75.0, 25.0, 0.0, 0.0, 0.0, 0.0]);
    let outcome = engine.estimate_parameters(&allocation, None);
    assert!(!outcome.is_fallback());

    // Blended: 0.015, 0.005, 0.015, 0.005
    let params = outcome.value();
    assert!((params.mean_monthly_return - 0.01).abs() < 1e-12);
    let expected_vol = sample_std_dev(&[0.015, 0.005, 0.015, 0.005]);
    assert!((params.monthly_volatility - expected_vol).abs() < 1e-12);
}

#[test]
fn test_estimate_rescales_over_covered_classes() {
    let provider = InMemoryProvider::new().with_constant(AssetClass::FixedIncome, START, 0.01, 60);
    let engine = MonteCarloEngine::new(context_with(Arc::new(provider)));

    let allocation = AllocationVector::new([50.0, 0.0, 0.0, 0.0, 0.0, 50.0]);
    let params = engine.estimate_parameters(&allocation, None).into_value();
    assert!((params.mean_monthly_return - 0.01).abs() < 1e-12);
    assert_eq!(params.monthly_volatility, 0.0);
}

#[test]
fn test_estimate_without_history_uses_defaults() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(OfflineProvider)));
    let outcome = engine.estimate_parameters(&AllocationVector::new(CONSERVATIVE), None);

    assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::NoHistoricalData));
    assert_eq!(
        *outcome.value(),
        SimulationParameters {
            mean_monthly_return: 0.01,
            monthly_volatility: 0.03,
        }
    );
}

#[test]
fn test_single_trial_collapses_statistics() {
    let engine = MonteCarloEngine::new(relaxed_context(Arc::new(OfflineProvider)));
    let result = engine
        .simulate_scenarios(&projection(1, 5))
        .unwrap()
        .into_value();

    assert_eq!(result.simulations, 1);
    assert_eq!(result.mean, result.median);
    assert_eq!(result.median, result.min);
    assert_eq!(result.min, result.max);
    assert_eq!(result.std_dev, 0.0);
}

#[test]
fn test_percentiles_are_ordered() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(OfflineProvider)));
    let outcome = engine.simulate_scenarios(&projection(2_000, 10)).unwrap();
    assert!(outcome.is_fallback());

    let r = outcome.value();
    assert_eq!(r.simulations, 2_000);
    assert!(r.std_dev > 0.0);
    assert!(r.min <= r.percentile_10);
    assert!(r.percentile_10 <= r.percentile_25);
    assert!(r.percentile_25 <= r.median);
    assert!(r.median <= r.percentile_75);
    assert!(r.percentile_75 <= r.percentile_90);
    assert!(r.percentile_90 <= r.max);
    assert!((0.0..=100.0).contains(&r.probability_of_doubling_pct));
    assert!((0.0..=100.0).contains(&r.probability_of_loss_pct));
}

#[test]
fn test_seed_makes_runs_reproducible() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(OfflineProvider)));
    let first = engine.simulate_scenarios(&projection(500, 3)).unwrap();
    let second = engine.simulate_scenarios(&projection(500, 3)).unwrap();
    assert_eq!(first.value(), second.value());

    let other_seed = ProjectionRequest {
        seed: Some(8),
        ..projection(500, 3)
    };
    let third = engine.simulate_scenarios(&other_seed).unwrap();
    assert_ne!(first.value().mean, third.value().mean);
}

#[test]
fn test_probabilities_follow_terminal_wealth() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(OfflineProvider)));
    let request = ProjectionRequest {
        monthly_contribution: 0.0,
        ..projection(100, 10)
    };

    let growing = engine
        .simulate_with_parameters(
            &request,
            SimulationParameters {
                mean_monthly_return: 0.01,
                monthly_volatility: 0.0,
            },
        )
        .unwrap();
    // 1.01^120 > 3
    assert_eq!(growing.probability_of_doubling_pct, 100.0);
    assert_eq!(growing.probability_of_loss_pct, 0.0);

    let shrinking = engine
        .simulate_with_parameters(
            &request,
            SimulationParameters {
                mean_monthly_return: -0.01,
                monthly_volatility: 0.0,
            },
        )
        .unwrap();
    assert_eq!(shrinking.probability_of_doubling_pct, 0.0);
    assert_eq!(shrinking.probability_of_loss_pct, 100.0);
}

#[test]
fn test_constant_history_projects_deterministically() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(constant_provider(0.01, 60))));
    let request = ProjectionRequest {
        monthly_contribution: 0.0,
        ..projection(100, 1)
    };
    let outcome = engine.simulate_scenarios(&request).unwrap();
    assert!(!outcome.is_fallback());

    let expected = 10_000.0 * 1.01f64.powi(12);
    let result = outcome.value();
    assert!((result.min - expected).abs() < 1e-6);
    assert!((result.max - expected).abs() < 1e-6);
}

#[test]
fn test_detailed_scenarios_are_ordered() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(OfflineProvider)));
    let request = ScenarioRequest::from(&projection(100, 20));
    let scenarios = engine.detailed_scenarios(&request).unwrap().into_value();

    assert_eq!(scenarios.months.len(), 20 * 12 + 1);
    assert_eq!(scenarios.optimistic.wealth.len(), 241);
    assert_eq!(scenarios.realistic.wealth[0], 10_000.0);
    assert!(scenarios.pessimistic.final_value <= scenarios.realistic.final_value);
    assert!(scenarios.realistic.final_value <= scenarios.optimistic.final_value);
    assert_eq!(
        scenarios.realistic.final_value,
        *scenarios.realistic.wealth.last().unwrap()
    );
    assert!((scenarios.optimistic.monthly_return - 0.04).abs() < 1e-12);
    assert!((scenarios.pessimistic.monthly_return - (-0.02)).abs() < 1e-12);
}

#[test]
fn test_detailed_scenarios_use_estimation_window() {
    // Only the most recent five years count toward estimation
    let mut values = vec![0.5; 60];
    values.extend(std::iter::repeat_n(0.01, 60));
    let provider = InMemoryProvider::new().with_values(AssetClass::FixedIncome, START, &values);
    let context = context_with(Arc::new(provider));
    assert_eq!(context.config.estimation_window, LookbackWindow::FiveYears);

    let engine = MonteCarloEngine::new(context);
    let request = ScenarioRequest {
        allocation: AllocationVector::new([100.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        initial_capital: 1_000.0,
        monthly_contribution: 0.0,
        horizon_years: 1,
    };
    let scenarios = engine.detailed_scenarios(&request).unwrap().into_value();
    assert!((scenarios.parameters.mean_monthly_return - 0.01).abs() < 1e-12);
    assert_eq!(scenarios.optimistic.final_value, scenarios.pessimistic.final_value);
}

#[test]
fn test_estimate_honours_explicit_window() {
    let mut values = vec![0.5; 108];
    values.extend(std::iter::repeat_n(0.01, 12));
    let provider = InMemoryProvider::new().with_values(AssetClass::FixedIncome, START, &values);
    let engine = MonteCarloEngine::new(context_with(Arc::new(provider)));
    let allocation = AllocationVector::new([100.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    let last_year = engine
        .estimate_parameters(&allocation, Some(LookbackWindow::OneYear))
        .into_value();
    assert!((last_year.mean_monthly_return - 0.01).abs() < 1e-12);
    assert_eq!(last_year.monthly_volatility, 0.0);

    let configured = engine.estimate_parameters(&allocation, None).into_value();
    assert!(configured.mean_monthly_return > 0.1);
}

#[test]
fn test_negative_volatility_is_rejected_before_trials() {
    let engine = MonteCarloEngine::new(context_with(Arc::new(OfflineProvider)));
    let result = engine.simulate_with_parameters(
        &projection(100, 1),
        SimulationParameters {
            mean_monthly_return: 0.01,
            monthly_volatility: -0.5,
        },
    );
    match result {
        Err(EngineError::Validation(e)) => assert_eq!(e.field, "monthly_volatility"),
        other => panic!("Expected a validation error, got {:?}", other),
    }

    let result = engine.simulate_with_parameters(
        &projection(100, 1),
        SimulationParameters {
            mean_monthly_return: f64::NAN,
            monthly_volatility: 0.03,
        },
    );
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[test]
fn test_negative_default_volatility_is_rejected() {
    let mut config = EngineConfig::default();
    config.default_parameters.monthly_volatility = -0.03;
    let engine = MonteCarloEngine::new(EngineContext::shared(config, Arc::new(OfflineProvider)));

    let scenarios = engine.detailed_scenarios(&ScenarioRequest::from(&projection(100, 20)));
    assert!(
        matches!(scenarios, Err(EngineError::Validation(_))),
        "Expected inverted scenarios to be rejected, got {:?}",
        scenarios
    );

    let projected = engine.simulate_scenarios(&projection(100, 1));
    assert!(matches!(
        projected,
        Err(EngineError::InvalidDistribution { .. })
    ));
}
