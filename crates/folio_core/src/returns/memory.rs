use std::sync::atomic::{AtomicUsize, Ordering};

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use super::{HistoricalReturnProvider, ReturnSeries};
use crate::error::RetrievalError;
use crate::model::{AssetClass, LookbackWindow};

/// Deterministic provider backed by series supplied up front.
///
/// Classes without a series report [`RetrievalError::Unavailable`]. Each
/// request is trimmed to the most recent `window.months()` points.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    series: FxHashMap<AssetClass, ReturnSeries>,
    requests: AtomicUsize,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_series(mut self, series: ReturnSeries) -> Self {
        self.series.insert(series.class(), series);
        self
    }

    /// Consecutive monthly values for `class` starting at `start`
    #[must_use]
    pub fn with_values(self, class: AssetClass, start: Date, values: &[f64]) -> Self {
        self.with_series(ReturnSeries::from_values(class, start, values))
    }

    /// Same constant return for `periods` months
    #[must_use]
    pub fn with_constant(self, class: AssetClass, start: Date, value: f64, periods: usize) -> Self {
        self.with_values(class, start, &vec![value; periods])
    }

    /// Number of `monthly_returns` calls served so far, including failures
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl HistoricalReturnProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn monthly_returns(
        &self,
        class: AssetClass,
        window: LookbackWindow,
    ) -> Result<ReturnSeries, RetrievalError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.series
            .get(&class)
            .map(|series| series.clone().tail(window.months()))
            .ok_or(RetrievalError::Unavailable(class))
    }
}
