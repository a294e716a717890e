//! Engine configuration
//!
//! Every field has a default, so an empty document (or no document at all)
//! yields a working configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AssetClass, LookbackWindow, SimulationParameters};

/// Accepted ranges for request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub min_initial_capital: f64,
    pub min_monthly_contribution: f64,
    pub min_horizon_years: u32,
    pub max_horizon_years: u32,
    pub min_simulations: usize,
    pub max_simulations: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_initial_capital: 100.0,
            min_monthly_contribution: 0.0,
            min_horizon_years: 1,
            max_horizon_years: 50,
            min_simulations: 100,
            max_simulations: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Annual risk-free rate used for Sharpe ratios
    pub risk_free_rate: f64,
    /// Monte Carlo parameters when no class has historical data
    pub default_parameters: SimulationParameters,
    /// Monthly walk used by the backtest when no class has historical data
    pub synthetic_walk: SimulationParameters,
    /// Decimal weight at or below which a class is left out of a backtest
    pub min_class_weight: f64,
    /// Window used to estimate Monte Carlo parameters
    pub estimation_window: LookbackWindow,
    /// Upper bound on one historical retrieval
    pub fetch_timeout_secs: u64,
    /// Representative instrument per class
    pub tickers: BTreeMap<AssetClass, String>,
    pub limits: ValidationLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.1175,
            default_parameters: SimulationParameters {
                mean_monthly_return: 0.01,
                monthly_volatility: 0.03,
            },
            synthetic_walk: SimulationParameters {
                mean_monthly_return: 0.01,
                monthly_volatility: 0.03,
            },
            min_class_weight: 0.001,
            estimation_window: LookbackWindow::FiveYears,
            fetch_timeout_secs: 10,
            tickers: default_tickers(),
            limits: ValidationLimits::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn ticker(&self, class: AssetClass) -> Option<&str> {
        self.tickers.get(&class).map(String::as_str)
    }
}

fn default_tickers() -> BTreeMap<AssetClass, String> {
    [
        (AssetClass::FixedIncome, "^IRX"),
        (AssetClass::DomesticEquity, "BOVA11.SA"),
        (AssetClass::InternationalEquity, "IVVB11.SA"),
        (AssetClass::RealEstateFunds, "IFIX.SA"),
        (AssetClass::Commodities, "GOLD11.SA"),
        (AssetClass::Crypto, "BTC-USD"),
    ]
    .into_iter()
    .map(|(class, ticker)| (class, ticker.to_string()))
    .collect()
}
