//! Layered configuration loader

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "AGEKEEPER_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "AGEKEEPER_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Prefix for environment overrides, e.g. `AGEKEEPER_SERVER__PORT`
const ENV_PREFIX: &str = "AGEKEEPER";

/// Separator for nested keys in environment overrides
const ENV_SEPARATOR: &str = "__";

/// Loads [`Settings`] from TOML files plus `AGEKEEPER_*` overrides.
///
/// Layered mode reads, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml`
/// 3. `local.toml`
/// 4. `AGEKEEPER_*` environment variables
///
/// Single-file mode replaces steps 1-3 with one required file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Build a loader from `AGEKEEPER_CONFIG_DIR`, `AGEKEEPER_CONFIG_FILE`
    /// and `AGEKEEPER_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Fails when both `AGEKEEPER_CONFIG_DIR` and `AGEKEEPER_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{} and {} cannot both be set. Use {} for layered configuration or {} for a single configuration file.",
                CONFIG_DIR_ENV, CONFIG_FILE_ENV, CONFIG_DIR_ENV, CONFIG_FILE_ENV
            )));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Loader that reads exactly one file, ignoring the config directory
    pub fn from_file(path: impl Into<PathBuf>, environment: AppEnvironment) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment,
        }
    }

    /// Loader that performs layered loading from `dir`
    pub fn from_dir(dir: impl Into<PathBuf>, environment: AppEnvironment) -> Self {
        Self {
            config_dir: dir.into(),
            config_file: None,
            environment,
        }
    }

    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Load, deserialize and validate settings.
    ///
    /// # Errors
    ///
    /// - `FileNotFound` when the required file is missing
    /// - `ParseError` when the merged configuration does not deserialize
    /// - `ValidationError` when a section fails validation
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and deserialize without running validation.
    ///
    /// Used by the CLI, which validates after applying its own overrides.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = match self.config_file {
            Some(ref file) => add_file_source(Config::builder(), file, true)?,
            None => self.add_layered_sources(Config::builder())?,
        };

        // AGEKEEPER_DATABASE__URL -> database.url
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn add_layered_sources(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = add_file_source(builder, &self.config_dir.join("default.toml"), true)?;
        let builder = add_file_source(
            builder,
            &self
                .config_dir
                .join(format!("{}.toml", self.environment.as_str())),
            false,
        )?;
        add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
}
