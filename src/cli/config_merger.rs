//! Applies CLI overrides on top of file-based configuration.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

/// Holds file-based settings and layers CLI arguments over them.
///
/// Precedence, highest first: `serve` options, global flags, configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Load base settings using `--config` and `--env` when given.
    ///
    /// Validation is deferred to [`merge_cli_args`](Self::merge_cli_args),
    /// so a CLI override can fix a value the files leave invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match cli.config {
            Some(ref path) => ConfigLoader::from_file(path, Environment::from_env()),
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };

        let environment = loader.environment();
        Ok(Self::new(loader.load_unvalidated()?, environment))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    /// Apply overrides and validate the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        let Commands::Serve {
            host,
            port,
            log_level,
            dry_run: _,
        } = cli.command();

        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
        if let Some(level) = log_level {
            config.logger.level = level.as_str().to_string();
        }

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn valid_base_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/test".to_string();
        config
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(valid_base_config(), Environment::Development).merge_cli_args(&cli)
    }

    #[test]
    fn test_no_overrides_keeps_base() {
        assert_eq!(merge(&["agekeeper"]).unwrap(), valid_base_config());
    }

    #[test]
    fn test_global_verbosity_flags() {
        assert_eq!(merge(&["agekeeper", "-v"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["agekeeper", "-q"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&[
            "agekeeper", "-q", "serve", "--host", "0.0.0.0", "--port", "9090", "--log-level", "trace",
        ])
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logger.level, "trace");
    }

    #[test]
    fn test_merged_config_is_validated() {
        let cli = Cli::try_parse_from(["agekeeper"]).unwrap();
        let merger = ConfigurationMerger::new(Settings::default(), Environment::Test);

        let err = merger.merge_cli_args(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "database.url"));
        assert_eq!(merger.environment(), Environment::Test);
    }

    #[test]
    fn test_from_cli_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agekeeper.toml");
        std::fs::write(&path, "[database]\nurl = \"postgres://file/db\"\n").unwrap();

        let cli = Cli::try_parse_from(["agekeeper", "--env", "staging", "--config", path.to_str().unwrap()]).unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();

        assert_eq!(merger.environment(), Environment::Staging);
        assert_eq!(merger.config().database.url, "postgres://file/db");
    }
}
