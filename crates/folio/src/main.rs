use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use folio::commands::{self, parse_allocation, parse_vector, parse_window};
use folio::settings::config_path;
use folio::{default_data_dir, init_logging, load_config, save_config};
use folio_core::model::{AllocationVector, LookbackWindow, NUM_ASSET_CLASSES};
use folio_core::{BacktestRequest, EngineConfig, ProjectionRequest, ScenarioRequest};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio allocation, backtesting and Monte Carlo projection")]
struct Args {
    /// Path to the data directory (default: ~/.folio/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Engine configuration file (default: <data_dir>/folio.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Skip live market data and use synthetic returns
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combine raw model predictions into a final allocation
    Allocate {
        /// Raw prediction: six comma-separated values (repeatable)
        #[arg(short, long = "raw", value_parser = parse_vector)]
        raw: Vec<[f64; NUM_ASSET_CLASSES]>,

        /// Ensemble weights, one per prediction (default: equal)
        #[arg(short, long, value_delimiter = ',')]
        weights: Option<Vec<f64>>,

        /// Risk profile label (Conservative, Moderate, Balanced, Growth, Aggressive)
        #[arg(short, long, default_value = "Moderate")]
        profile: String,
    },

    /// Map a normalized risk score in [0, 1] to a profile
    Profile {
        score: f64,
    },

    /// List asset classes with their reference assumptions
    Universe,

    /// Replay an allocation over historical monthly returns
    Backtest {
        #[command(flatten)]
        portfolio: PortfolioArgs,

        /// Lookback window (1y, 2y, 5y, 10y)
        #[arg(short, long, default_value = "5y", value_parser = parse_window)]
        window: LookbackWindow,

        /// Also replay single-class benchmarks
        #[arg(long)]
        benchmarks: bool,
    },

    /// Monte Carlo projection of terminal wealth
    Project {
        #[command(flatten)]
        portfolio: PortfolioArgs,

        /// Horizon in years
        #[arg(short = 'y', long, default_value_t = 10)]
        years: u32,

        /// Number of simulated trials
        #[arg(short = 'n', long, default_value_t = 1000)]
        simulations: usize,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Optimistic, realistic and pessimistic deterministic paths
    Scenarios {
        #[command(flatten)]
        portfolio: PortfolioArgs,

        /// Horizon in years
        #[arg(short = 'y', long, default_value_t = 10)]
        years: u32,
    },

    /// Expected return, risk and Sharpe ratio from reference assumptions
    Expected {
        /// Allocation as class=pct pairs or six positional percentages
        #[arg(short, long, value_parser = parse_allocation)]
        allocation: AllocationVector,

        /// Horizon in years for the projected value
        #[arg(short = 'y', long, default_value_t = 1)]
        years: u32,
    },

    /// Write the default configuration to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug)]
struct PortfolioArgs {
    /// Allocation as class=pct pairs or six positional percentages
    #[arg(short, long, value_parser = parse_allocation)]
    allocation: AllocationVector,

    /// Initial capital
    #[arg(short = 'i', long, default_value_t = 10_000.0)]
    initial_capital: f64,

    /// Contribution added after every month
    #[arg(short = 'm', long, default_value_t = 0.0)]
    monthly_contribution: f64,
}

fn print_json<T: Serialize>(value: &T) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let _log_guard = init_logging(&data_dir, &args.log_level)?;

    let config_file = args.config.unwrap_or_else(|| config_path(&data_dir));
    // init-config must work even when the existing file no longer parses
    let config = if matches!(args.command, Command::InitConfig { .. }) {
        EngineConfig::default()
    } else {
        load_config(&config_file)?
    };

    match args.command {
        Command::Allocate {
            raw,
            weights,
            profile,
        } => {
            let report = commands::allocate(&raw, weights.as_deref(), &profile, &config)
                .map_err(|e| eyre!(e))?;
            print_json(&report)?;
        }
        Command::Profile { score } => {
            if !(0.0..=1.0).contains(&score) {
                return Err(eyre!("risk score must be between 0 and 1, got {score}"));
            }
            print_json(&commands::profile(score))?;
        }
        Command::Universe => print_json(&commands::universe(&config))?,
        Command::Backtest {
            portfolio,
            window,
            benchmarks,
        } => {
            let request = BacktestRequest {
                allocation: portfolio.allocation,
                initial_capital: portfolio.initial_capital,
                monthly_contribution: portfolio.monthly_contribution,
                window,
            };
            let context = commands::build_context(config, args.offline);
            print_json(&commands::backtest(context, &request, benchmarks)?)?;
        }
        Command::Project {
            portfolio,
            years,
            simulations,
            seed,
        } => {
            let request = ProjectionRequest {
                allocation: portfolio.allocation,
                initial_capital: portfolio.initial_capital,
                monthly_contribution: portfolio.monthly_contribution,
                horizon_years: years,
                simulations,
                seed,
            };
            let context = commands::build_context(config, args.offline);
            print_json(&commands::project(context, &request)?)?;
        }
        Command::Scenarios { portfolio, years } => {
            let request = ScenarioRequest {
                allocation: portfolio.allocation,
                initial_capital: portfolio.initial_capital,
                monthly_contribution: portfolio.monthly_contribution,
                horizon_years: years,
            };
            let context = commands::build_context(config, args.offline);
            print_json(&commands::scenarios(context, &request)?)?;
        }
        Command::Expected { allocation, years } => {
            print_json(&commands::expected(&allocation, years, &config))?;
        }
        Command::InitConfig { force } => {
            if config_file.exists() && !force {
                return Err(eyre!(
                    "{} already exists (use --force to overwrite)",
                    config_file.display()
                ));
            }
            save_config(&config, &config_file)?;
            tracing::info!(path = %config_file.display(), "wrote configuration");
            println!("{}", config_file.display());
        }
    }

    Ok(())
}
