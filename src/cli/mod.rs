//! Command-line interface: argument parsing, config overrides and dispatch.

pub mod config_merger;
pub mod executor;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};
