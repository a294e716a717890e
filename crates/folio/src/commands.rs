//! Subcommand implementations
//!
//! Each command returns a serializable report; `main` prints it as JSON.

use std::collections::BTreeMap;
use std::sync::Arc;

use folio_core::ensemble::{EnsembleCombiner, RawAllocation};
use folio_core::model::{
    AllocationVector, AssetClass, AssetUniverse, DetailedScenarios, LookbackWindow,
    MonteCarloResult, NUM_ASSET_CLASSES, Outcome, RiskProfile,
};
use folio_core::returns::{HistoricalReturnProvider, OfflineProvider};
use folio_core::{
    BacktestEngine, BacktestRequest, EngineConfig, EngineContext, EngineError, ExpectedMetrics,
    MonteCarloEngine, ProjectionRequest, ScenarioRequest, expected_metrics, suggested_products,
    validation,
};
use serde::Serialize;

/// Parse an allocation given as `class=pct` pairs or as six positional percentages.
///
/// `fixed_income=50,domestic_equity=50` and `50,50,0,0,0,0` are equivalent.
pub fn parse_allocation(input: &str) -> Result<AllocationVector, String> {
    if input.contains('=') {
        let mut map = BTreeMap::new();
        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (class, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected class=percentage, got '{pair}'"))?;
            let class: AssetClass = class.trim().parse()?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| format!("invalid percentage for {class}: '{value}'"))?;
            map.insert(class, value);
        }
        Ok(AllocationVector::from_map(&map))
    } else {
        parse_vector(input).map(AllocationVector::new)
    }
}

/// Parse six comma-separated numbers in canonical class order
pub fn parse_vector(input: &str) -> Result<[f64; NUM_ASSET_CLASSES], String> {
    let values = input
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", v.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    values.try_into().map_err(|values: Vec<f64>| {
        format!(
            "expected {NUM_ASSET_CLASSES} values, got {}",
            values.len()
        )
    })
}

/// Build the shared engine context, preferring live data unless `offline` is set
pub fn build_context(config: EngineConfig, offline: bool) -> Arc<EngineContext> {
    let provider = select_provider(&config, offline);
    tracing::info!(provider = provider.name(), "using historical return provider");
    EngineContext::shared(config, provider)
}

#[cfg(feature = "native")]
fn select_provider(config: &EngineConfig, offline: bool) -> Arc<dyn HistoricalReturnProvider> {
    if offline {
        return Arc::new(OfflineProvider);
    }
    match folio_core::returns::YahooChartProvider::from_config(config) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            tracing::warn!(error = %e, "live provider unavailable, running offline");
            Arc::new(OfflineProvider)
        }
    }
}

#[cfg(not(feature = "native"))]
fn select_provider(_config: &EngineConfig, _offline: bool) -> Arc<dyn HistoricalReturnProvider> {
    Arc::new(OfflineProvider)
}

#[derive(Debug, Serialize)]
pub struct AllocationReport {
    pub profile: RiskProfile,
    pub allocation: Outcome<AllocationVector>,
    pub expected: ExpectedMetrics,
    pub suggested_products: BTreeMap<AssetClass, &'static [&'static str]>,
}

/// Combine raw predictions for a profile label. Without weights, predictions count equally.
pub fn allocate(
    raw: &[[f64; NUM_ASSET_CLASSES]],
    weights: Option<&[f64]>,
    profile_label: &str,
    config: &EngineConfig,
) -> Result<AllocationReport, String> {
    let weights: Vec<f64> = match weights {
        Some(w) if w.len() != raw.len() => {
            return Err(format!(
                "{} weights given for {} predictions",
                w.len(),
                raw.len()
            ));
        }
        Some(w) => w.to_vec(),
        None => vec![1.0 / raw.len().max(1) as f64; raw.len()],
    };
    validation::validate_ensemble_weights(&weights).map_err(|e| e.to_string())?;

    let profile = RiskProfile::resolve(profile_label);
    let raw: Vec<RawAllocation> = raw
        .iter()
        .zip(weights)
        .map(|(values, weight)| RawAllocation::new(*values, weight))
        .collect();

    let allocation = EnsembleCombiner::default().combine(&raw, profile);
    let expected = expected_metrics(allocation.value(), 1, config.risk_free_rate).rounded();
    let suggested_products = suggested_products(allocation.value());
    Ok(AllocationReport {
        profile,
        allocation,
        expected,
        suggested_products,
    })
}

#[derive(Debug, Serialize)]
pub struct ProfileReport {
    pub score: f64,
    pub profile: RiskProfile,
    pub reference_allocation: AllocationVector,
}

pub fn profile(score: f64) -> ProfileReport {
    let profile = RiskProfile::from_score(score);
    ProfileReport {
        score,
        profile,
        reference_allocation: folio_core::FallbackTable::default().get(profile),
    }
}

#[derive(Debug, Serialize)]
pub struct UniverseEntry {
    pub class: AssetClass,
    pub name: &'static str,
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub ticker: Option<String>,
}

pub fn universe(config: &EngineConfig) -> Vec<UniverseEntry> {
    AssetUniverse::classes()
        .iter()
        .map(|&class| {
            let reference = AssetUniverse::reference(class);
            UniverseEntry {
                class,
                name: class.display_name(),
                annual_return: reference.annual_return,
                annual_volatility: reference.annual_volatility,
                ticker: config.ticker(class).map(str::to_string),
            }
        })
        .collect()
}

pub fn backtest(
    context: Arc<EngineContext>,
    request: &BacktestRequest,
    benchmarks: bool,
) -> Result<serde_json::Value, EngineError> {
    let engine = BacktestEngine::new(context);
    let value = if benchmarks {
        let outcome = engine.compare_with_benchmarks(request)?.map(|mut comparison| {
            comparison.portfolio = comparison.portfolio.rounded();
            for (_, result) in &mut comparison.benchmarks {
                *result = result.rounded();
            }
            comparison
        });
        serde_json::to_value(outcome)
    } else {
        serde_json::to_value(engine.run(request)?.map(|r| r.rounded()))
    };
    // Result types only hold numbers, strings and dates
    Ok(value.unwrap_or(serde_json::Value::Null))
}

pub fn project(
    context: Arc<EngineContext>,
    request: &ProjectionRequest,
) -> Result<Outcome<MonteCarloResult>, EngineError> {
    let engine = MonteCarloEngine::new(context);
    Ok(engine.simulate_scenarios(request)?.map(|r| r.rounded()))
}

pub fn scenarios(
    context: Arc<EngineContext>,
    request: &ScenarioRequest,
) -> Result<Outcome<DetailedScenarios>, EngineError> {
    let engine = MonteCarloEngine::new(context);
    Ok(engine.detailed_scenarios(request)?.map(|s| s.rounded()))
}

pub fn expected(allocation: &AllocationVector, horizon_years: u32, config: &EngineConfig) -> ExpectedMetrics {
    expected_metrics(allocation, horizon_years, config.risk_free_rate).rounded()
}

pub fn parse_window(input: &str) -> Result<LookbackWindow, String> {
    input.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allocation_forms() {
        let named = parse_allocation("fixed_income=50, domestic_equity=50").unwrap();
        let positional = parse_allocation("50,50,0,0,0,0").unwrap();
        assert_eq!(named, positional);

        assert!(parse_allocation("stocks=100").is_err());
        assert!(parse_allocation("50,50").is_err());
        assert!(parse_allocation("fixed_income=lots").is_err());
    }

    #[test]
    fn test_allocate_defaults_to_equal_weights() {
        let raw = [[0.6, 0.2, 0.1, 0.1, 0.0, 0.0], [0.2, 0.4, 0.3, 0.05, 0.03, 0.02]];
        let report = allocate(&raw, None, "balanced", &EngineConfig::default()).unwrap();
        assert_eq!(report.profile, RiskProfile::Balanced);
        assert!(!report.allocation.is_fallback());
        assert!((report.allocation.value().total() - 100.0).abs() <= 0.1);

        assert!(allocate(&raw, Some(&[1.0]), "balanced", &EngineConfig::default()).is_err());
        assert_eq!(
            report.suggested_products.len(),
            report.allocation.value().iter().filter(|(_, v)| *v > 0.0).count()
        );
    }

    #[test]
    fn test_allocate_rejects_unnormalized_weights() {
        let config = EngineConfig::default();
        let raw = [[0.05; 6], [0.05; 6]];

        // Summed weights of 0.5 leave the blend degenerate
        let report = allocate(&raw, Some(&[0.5, 0.5]), "moderate", &config).unwrap();
        assert!(report.allocation.is_fallback());

        // Scaling the weights up must not rescue it
        assert!(allocate(&raw, Some(&[5.0, 5.0]), "moderate", &config).is_err());
        assert!(allocate(&raw, Some(&[-1.0, 2.0]), "moderate", &config).is_err());
    }

    #[test]
    fn test_allocate_without_predictions_uses_profile() {
        let report = allocate(&[], None, "mystery", &EngineConfig::default()).unwrap();
        assert_eq!(report.profile, RiskProfile::Moderate);
        assert!(report.allocation.is_fallback());
    }

    #[test]
    fn test_profile_from_score() {
        let report = profile(0.9);
        assert_eq!(report.profile, RiskProfile::Aggressive);
        assert_eq!(
            report.reference_allocation.as_array(),
            &[10.0, 40.0, 35.0, 10.0, 3.0, 2.0]
        );
    }

    #[test]
    fn test_offline_backtest_report() {
        let context = build_context(EngineConfig::default(), true);
        let request = BacktestRequest {
            allocation: parse_allocation("50,20,15,10,3,2").unwrap(),
            initial_capital: 10_000.0,
            monthly_contribution: 100.0,
            window: LookbackWindow::OneYear,
        };
        let value = backtest(context, &request, true).unwrap();
        assert_eq!(value["status"], "fell_back");
        assert_eq!(value["reason"]["kind"], "no_historical_data");
        assert_eq!(value["value"]["benchmarks"].as_array().map(Vec::len), Some(3));
    }
}
