//! Portfolio allocation and analytics library
//!
//! This crate turns raw model outputs into a presentable asset allocation and
//! evaluates that allocation against history and randomized projections.
//! It supports:
//! - Six fixed asset classes with reference return/volatility assumptions
//! - Weighted ensemble combination of raw allocation predictions with
//!   per-risk-profile fallbacks
//! - Monthly historical return series behind a provider trait, with a
//!   process-wide cache and synthetic fallback
//! - Historical backtesting with contributions, Sharpe ratio and drawdown
//! - Monte Carlo wealth projection plus optimistic/realistic/pessimistic paths
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_core::{EngineContext, MonteCarloEngine, ProjectionRequest};
//! use folio_core::returns::OfflineProvider;
//!
//! let context = Arc::new(EngineContext::new(Default::default(), Arc::new(OfflineProvider)));
//! let engine = MonteCarloEngine::new(context);
//! let result = engine.simulate_scenarios(&ProjectionRequest {
//!     allocation: allocation.clone(),
//!     initial_capital: 10_000.0,
//!     monthly_contribution: 500.0,
//!     horizon_years: 10,
//!     simulations: 1_000,
//!     seed: None,
//! })?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod backtest;
pub mod config;
pub mod context;
pub mod ensemble;
pub mod error;
pub mod expected;
pub mod monte_carlo;
pub mod returns;
pub mod stats;
pub mod validation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use backtest::{BacktestEngine, BacktestRequest};
pub use config::{EngineConfig, ValidationLimits};
pub use context::EngineContext;
pub use ensemble::{EnsembleCombiner, FallbackTable, RawAllocation, WeightedEnsemble};
pub use error::{EngineError, ValidationError};
pub use expected::{ExpectedMetrics, expected_metrics, suggested_products};
pub use model::{AllocationVector, AssetClass, LookbackWindow, Outcome, RiskProfile};
pub use monte_carlo::{MonteCarloEngine, ProjectionRequest, ScenarioRequest, SimulationParameters};
