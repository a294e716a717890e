//! Command-line front end for the folio allocation and analytics engine
//!
//! This crate wires configuration, logging and the historical data provider
//! around `folio_core` and exposes its engines as subcommands.

pub mod commands;
pub mod logging;
pub mod settings;

pub use logging::init_logging;
pub use settings::{default_data_dir, load_config, save_config};
