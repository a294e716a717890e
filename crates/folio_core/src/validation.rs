//! Request parameter checks run before any computation

use crate::config::{EngineConfig, ValidationLimits};
use crate::error::ValidationError;
use crate::model::{AllocationVector, SimulationParameters};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Allocation percentages must be finite, within 0..=100, and have a positive total
pub fn validate_allocation(allocation: &AllocationVector) -> Result<(), ValidationError> {
    for (class, value) in allocation.iter() {
        if !value.is_finite() {
            return Err(ValidationError::new(
                class.id(),
                "Allocation must be a finite number",
            ));
        }
        if !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::new(
                class.id(),
                format!("Allocation must be between 0 and 100, got {value}"),
            ));
        }
    }

    if allocation.total() <= 0.0 {
        return Err(ValidationError::new(
            "allocation",
            "Allocation must have at least one positive entry",
        ));
    }

    Ok(())
}

pub fn validate_initial_capital(
    capital: f64,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    if !capital.is_finite() || capital < limits.min_initial_capital {
        return Err(ValidationError::new(
            "initial_capital",
            format!(
                "Initial capital must be at least {}",
                limits.min_initial_capital
            ),
        ));
    }
    Ok(())
}

pub fn validate_monthly_contribution(
    contribution: f64,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    if !contribution.is_finite() || contribution < limits.min_monthly_contribution {
        return Err(ValidationError::new(
            "monthly_contribution",
            format!(
                "Monthly contribution must be at least {}",
                limits.min_monthly_contribution
            ),
        ));
    }
    Ok(())
}

pub fn validate_horizon(years: u32, limits: &ValidationLimits) -> Result<(), ValidationError> {
    if years < limits.min_horizon_years || years > limits.max_horizon_years {
        return Err(ValidationError::new(
            "horizon_years",
            format!(
                "Horizon must be between {} and {} years",
                limits.min_horizon_years, limits.max_horizon_years
            ),
        ));
    }
    Ok(())
}

/// Monte Carlo trial count. Zero is rejected even when the configured minimum allows it.
pub fn validate_simulations(count: usize, limits: &ValidationLimits) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::new(
            "simulations",
            "Simulations must be greater than 0",
        ));
    }

    if count < limits.min_simulations || count > limits.max_simulations {
        return Err(ValidationError::new(
            "simulations",
            format!(
                "Simulations must be between {} and {}",
                limits.min_simulations, limits.max_simulations
            ),
        ));
    }
    Ok(())
}

/// Normal return parameters: a finite mean and a finite, non-negative volatility
pub fn validate_parameters(parameters: &SimulationParameters) -> Result<(), ValidationError> {
    check_parameters(parameters, "")
}

fn check_parameters(parameters: &SimulationParameters, prefix: &str) -> Result<(), ValidationError> {
    if !parameters.mean_monthly_return.is_finite() {
        return Err(ValidationError::new(
            format!("{prefix}mean_monthly_return"),
            "Mean monthly return must be a finite number",
        ));
    }
    let vol = parameters.monthly_volatility;
    if !vol.is_finite() || vol < 0.0 {
        return Err(ValidationError::new(
            format!("{prefix}monthly_volatility"),
            format!("Monthly volatility must be a non-negative number, got {vol}"),
        ));
    }
    Ok(())
}

/// Ensemble weights must be finite, non-negative and sum to 1.
///
/// An empty list is accepted; combining nothing falls back to the profile allocation.
pub fn validate_ensemble_weights(weights: &[f64]) -> Result<(), ValidationError> {
    if let Some((i, weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(ValidationError::new(
            "weights",
            format!("Weight {i} must be non-negative, got {weight}"),
        ));
    }

    let total: f64 = weights.iter().sum();
    if !weights.is_empty() && (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ValidationError::new(
            "weights",
            format!("Weights must sum to 1, got {total}"),
        ));
    }
    Ok(())
}

/// Engine configuration as loaded from a file
pub fn validate_config(config: &EngineConfig) -> Result<(), ValidationError> {
    if !config.risk_free_rate.is_finite() {
        return Err(ValidationError::new(
            "risk_free_rate",
            "Risk-free rate must be a finite number",
        ));
    }
    if !(0.0..1.0).contains(&config.min_class_weight) {
        return Err(ValidationError::new(
            "min_class_weight",
            format!(
                "Minimum class weight must be in [0, 1), got {}",
                config.min_class_weight
            ),
        ));
    }
    check_parameters(&config.default_parameters, "default_parameters.")?;
    check_parameters(&config.synthetic_walk, "synthetic_walk.")?;

    let limits = &config.limits;
    if limits.min_horizon_years > limits.max_horizon_years {
        return Err(ValidationError::new(
            "limits.min_horizon_years",
            "Minimum horizon cannot exceed the maximum",
        ));
    }
    if limits.min_simulations > limits.max_simulations {
        return Err(ValidationError::new(
            "limits.min_simulations",
            "Minimum simulations cannot exceed the maximum",
        ));
    }
    Ok(())
}
