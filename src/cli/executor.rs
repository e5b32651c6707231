//! Runs the parsed command.

use super::config_merger::ConfigurationMerger;
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};
use crate::logger::init_logger;
use crate::server::Server;

/// Load configuration, apply CLI overrides and run the selected command.
///
/// The logger is created here and flushed before returning, including when
/// the server exits with an error.
pub async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    let merger = ConfigurationMerger::from_cli(&cli)?;
    let environment = merger.environment();
    let settings = merger.merge_cli_args(&cli)?;

    let Commands::Serve { dry_run, .. } = cli.command();
    if dry_run {
        print_dry_run_summary(&settings, environment);
        return Ok(());
    }

    let logger = init_logger(settings.logger.clone().into_logger_config()?)?;

    let result = Server::new(settings, environment).run().await;
    if let Err(ref e) = result {
        tracing::error!(error = %e, "Server terminated with error");
    }

    if let Err(e) = logger.shutdown() {
        eprintln!("Failed to flush logs: {}", e);
    }

    result
}

fn print_dry_run_summary(settings: &Settings, environment: Environment) {
    println!("✓ Configuration is valid");
    println!("✓ Environment: {}", environment);
    println!("✓ Server would bind to: {}", settings.server.address());
    println!(
        "✓ Database pool: {}-{} connections, query timeout {}s",
        settings.database.min_connections,
        settings.database.max_connections,
        settings.database.query_timeout
    );
    println!(
        "✓ Logger: level={}, console={}, file={}",
        settings.logger.level, settings.logger.console.enabled, settings.logger.file.enabled
    );
    println!("Dry run completed successfully");
}
