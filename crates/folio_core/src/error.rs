use crate::model::AssetClass;

/// A request parameter outside its accepted range.
///
/// This is the only error class meant to reach a client: every other failure
/// inside the engine is recovered through a fallback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid parameter: {field} - {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while retrieving historical prices for an asset class.
///
/// These never leave [`crate::returns::ReturnSource`]; they are logged and
/// replaced by a synthetic series.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("no instrument configured for {0}")]
    NoInstrument(AssetClass),

    #[error("request for {ticker} failed: {message}")]
    Transport { ticker: String, message: String },

    #[error("request for {ticker} returned status {status}")]
    Status { ticker: String, status: u16 },

    #[error("could not parse response for {ticker}: {message}")]
    Parse { ticker: String, message: String },

    #[error("no price data returned for {0}")]
    Empty(String),

    #[error("historical data unavailable for {0}")]
    Unavailable(AssetClass),
}

/// Failure reported by an external allocation predictor.
#[derive(Debug, Clone, thiserror::Error)]
#[error("predictor {name} failed: {message}")]
pub struct PredictionError {
    pub name: String,
    pub message: String,
}

/// Errors returned by engine entry points.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid {distribution} parameters (mean={mean}, std_dev={std_dev})")]
    InvalidDistribution {
        distribution: &'static str,
        mean: f64,
        std_dev: f64,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
