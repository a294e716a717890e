//! Monthly historical return series
//!
//! A [`HistoricalReturnProvider`] supplies raw series per asset class.
//! [`ReturnSource`] wraps one provider with a process-lifetime cache and the
//! synthetic fallback, so engines never see a retrieval failure.

mod memory;
mod offline;
#[cfg(feature = "live")]
mod yahoo;

pub use memory::InMemoryProvider;
pub use offline::OfflineProvider;
#[cfg(feature = "live")]
pub use yahoo::YahooChartProvider;

use std::sync::{Arc, RwLock};

use jiff::ToSpan;
use jiff::civil::Date;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::model::{AssetClass, AssetUniverse, FallbackReason, LookbackWindow, Outcome};

/// Fractional return of one calendar month, labelled by the first day of that month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub month: Date,
    pub value: f64,
}

/// Ordered monthly returns of one asset class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    class: AssetClass,
    points: Vec<MonthlyReturn>,
}

impl ReturnSeries {
    /// Build a series, dropping non-finite values and keeping one point per month
    #[must_use]
    pub fn new(class: AssetClass, points: Vec<MonthlyReturn>) -> Self {
        let mut points: Vec<MonthlyReturn> = points
            .into_iter()
            .filter(|p| p.value.is_finite())
            .map(|p| MonthlyReturn {
                month: p.month.first_of_month(),
                value: p.value,
            })
            .collect();
        points.sort_by_key(|p| p.month);
        points.dedup_by_key(|p| p.month);
        Self { class, points }
    }

    /// Consecutive monthly values starting at `start`
    #[must_use]
    pub fn from_values(class: AssetClass, start: Date, values: &[f64]) -> Self {
        let start = start.first_of_month();
        let points = values
            .iter()
            .enumerate()
            .filter_map(|(i, &value)| {
                start
                    .checked_add((i as i64).months())
                    .ok()
                    .map(|month| MonthlyReturn { month, value })
            })
            .collect();
        Self::new(class, points)
    }

    #[must_use]
    pub fn class(&self) -> AssetClass {
        self.class
    }

    #[must_use]
    pub fn points(&self) -> &[MonthlyReturn] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn months(&self) -> impl Iterator<Item = Date> + '_ {
        self.points.iter().map(|p| p.month)
    }

    /// Return recorded for `month`, if any
    #[must_use]
    pub fn value_at(&self, month: Date) -> Option<f64> {
        let month = month.first_of_month();
        self.points
            .binary_search_by_key(&month, |p| p.month)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Keep only the most recent `months` points
    #[must_use]
    pub fn tail(mut self, months: usize) -> Self {
        if self.points.len() > months {
            self.points.drain(..self.points.len() - months);
        }
        self
    }
}

/// Source of raw monthly returns for an asset class
pub trait HistoricalReturnProvider: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    fn monthly_returns(
        &self,
        class: AssetClass,
        window: LookbackWindow,
    ) -> Result<ReturnSeries, RetrievalError>;
}

/// One weighted series taking part in a blend
pub struct WeightedSeries<'a> {
    pub weight: f64,
    pub series: &'a ReturnSeries,
}

/// Blend of several class series on a shared month index
#[derive(Debug, Clone, PartialEq)]
pub struct BlendedSeries {
    pub months: Vec<Date>,
    pub returns: Vec<f64>,
}

/// Weighted sum of class returns on the anchor's month index.
///
/// The first series is the anchor: every one of its months appears in the
/// output. Another series without a return for an anchor month adds nothing
/// to that period. Returns `None` when there is nothing to blend.
#[must_use]
pub fn blend(parts: &[WeightedSeries<'_>]) -> Option<BlendedSeries> {
    let anchor = parts.first()?.series;
    if anchor.is_empty() {
        return None;
    }

    let months: Vec<Date> = anchor.months().collect();
    let returns = months
        .iter()
        .map(|&month| {
            parts
                .iter()
                .map(|part| part.weight * part.series.value_at(month).unwrap_or(0.0))
                .sum()
        })
        .collect();

    Some(BlendedSeries { months, returns })
}

/// Random monthly series from a class's reference assumptions, ending at `end`'s month
pub fn synthetic_series<R: Rng + ?Sized>(
    class: AssetClass,
    window: LookbackWindow,
    end: Date,
    rng: &mut R,
) -> ReturnSeries {
    let reference = AssetUniverse::reference(class);
    let periods = window.months();
    let start = end
        .first_of_month()
        .checked_sub(((periods - 1) as i64).months())
        .unwrap_or(end.first_of_month());

    let values: Vec<f64> = match Normal::new(reference.monthly_mean(), reference.monthly_volatility())
    {
        Ok(dist) => (0..periods).map(|_| dist.sample(rng)).collect(),
        Err(_) => vec![reference.monthly_mean(); periods],
    };

    ReturnSeries::from_values(class, start, &values)
}

/// Month of the current date in the system time zone
#[must_use]
pub fn current_month() -> Date {
    jiff::Zoned::now().date().first_of_month()
}

type CacheKey = (AssetClass, LookbackWindow);

/// Cached, failure-absorbing access to a [`HistoricalReturnProvider`].
///
/// Only real provider data is cached. A class that falls back to a synthetic
/// series is retried on the next call.
pub struct ReturnSource {
    provider: Arc<dyn HistoricalReturnProvider>,
    cache: RwLock<FxHashMap<CacheKey, Arc<ReturnSeries>>>,
}

impl ReturnSource {
    pub fn new(provider: Arc<dyn HistoricalReturnProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Provider data for `(class, window)`, or `None` when retrieval failed
    pub fn historical(&self, class: AssetClass, window: LookbackWindow) -> Option<Arc<ReturnSeries>> {
        let key = (class, window);
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(series) = cache.get(&key) {
                return Some(Arc::clone(series));
            }
        }

        let series = match self.provider.monthly_returns(class, window) {
            Ok(series) if !series.is_empty() => series.tail(window.months()),
            Ok(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    %class,
                    %window,
                    "provider returned an empty series"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    %class,
                    %window,
                    error = %e,
                    "historical retrieval failed"
                );
                return None;
            }
        };

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have filled the slot while we were fetching
        let entry = cache.entry(key).or_insert_with(|| Arc::new(series));
        tracing::debug!(%class, %window, periods = entry.len(), "cached return series");
        Some(Arc::clone(entry))
    }

    /// Provider data, or a synthetic series from the class's reference assumptions
    pub fn series(&self, class: AssetClass, window: LookbackWindow) -> Outcome<Arc<ReturnSeries>> {
        match self.historical(class, window) {
            Some(series) => Outcome::computed(series),
            None => {
                tracing::warn!(%class, %window, "using synthetic return series");
                let series = synthetic_series(class, window, current_month(), &mut rand::rng());
                Outcome::fell_back(
                    Arc::new(series),
                    FallbackReason::SyntheticSeries { class },
                )
            }
        }
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear_cache(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
