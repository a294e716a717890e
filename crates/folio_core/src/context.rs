use std::sync::Arc;

use crate::config::EngineConfig;
use crate::returns::{HistoricalReturnProvider, ReturnSource};

/// Shared state handed to every engine: configuration and the cached return source.
///
/// Engines hold an `Arc<EngineContext>`, so one context (and one cache) can
/// serve any number of concurrent requests.
pub struct EngineContext {
    pub config: EngineConfig,
    pub returns: ReturnSource,
}

impl EngineContext {
    pub fn new(config: EngineConfig, provider: Arc<dyn HistoricalReturnProvider>) -> Self {
        tracing::debug!(provider = provider.name(), "creating engine context");
        Self {
            config,
            returns: ReturnSource::new(provider),
        }
    }

    /// Context wrapped for sharing between engines
    pub fn shared(config: EngineConfig, provider: Arc<dyn HistoricalReturnProvider>) -> Arc<Self> {
        Arc::new(Self::new(config, provider))
    }
}
