//! Integration tests for the allocation and analytics engines
//!
//! Tests are organized by topic:
//! - `ensemble` - Combining raw predictions and profile fallbacks
//! - `returns` - Return source caching and synthetic fallback
//! - `backtest` - Historical replay statistics
//! - `monte_carlo` - Parameter estimation, trials and deterministic scenarios
//! - `validation` - Request rejection at engine entry points

mod monte_carlo;

use std::sync::Arc;

use jiff::civil::{Date, date};

use crate::config::{EngineConfig, ValidationLimits};
use crate::context::EngineContext;
use crate::model::AssetClass;
use crate::returns::{HistoricalReturnProvider, InMemoryProvider};

pub(crate) const START: Date = date(2024, 1, 1);

/// Provider returning the same constant monthly return for every class
pub(crate) fn constant_provider(value: f64, periods: usize) -> InMemoryProvider {
    AssetClass::ALL
        .into_iter()
        .fold(InMemoryProvider::new(), |provider, class| {
            provider.with_constant(class, START, value, periods)
        })
}

pub(crate) fn context_with(provider: Arc<dyn HistoricalReturnProvider>) -> Arc<EngineContext> {
    EngineContext::shared(EngineConfig::default(), provider)
}

/// Context accepting any positive simulation count
pub(crate) fn relaxed_context(provider: Arc<dyn HistoricalReturnProvider>) -> Arc<EngineContext> {
    let config = EngineConfig {
        limits: ValidationLimits {
            min_simulations: 1,
            ..ValidationLimits::default()
        },
        ..EngineConfig::default()
    };
    EngineContext::shared(config, provider)
}
