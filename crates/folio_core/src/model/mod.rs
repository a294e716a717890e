mod allocation;
mod asset;
mod outcome;
mod profile;
mod results;
mod window;

pub use allocation::{AllocationVector, SUM_TOLERANCE};
pub use asset::{AssetClass, AssetUniverse, NUM_ASSET_CLASSES, ReferenceAssumption};
pub use outcome::{FallbackReason, Outcome};
pub use profile::RiskProfile;
pub use results::{
    BacktestResult, BenchmarkComparison, DetailedScenarios, MonteCarloResult, ScenarioPath,
    SimulationParameters,
};
pub use window::LookbackWindow;
