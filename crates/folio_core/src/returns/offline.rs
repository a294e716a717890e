use super::{HistoricalReturnProvider, ReturnSeries};
use crate::error::RetrievalError;
use crate::model::{AssetClass, LookbackWindow};

/// Provider with no data source; every class falls back to synthetic returns
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl HistoricalReturnProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn monthly_returns(
        &self,
        class: AssetClass,
        _window: LookbackWindow,
    ) -> Result<ReturnSeries, RetrievalError> {
        Err(RetrievalError::Unavailable(class))
    }
}
