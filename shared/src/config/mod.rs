//! Configuration module with business-specific sub-modules
//!
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `token` - Refresh-token lifetime, store timeouts and expiry sweeping

pub mod database;
pub mod environment;
pub mod token;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use token::{CleanupConfig, RefreshTokenConfig, MIN_SECRET_BYTES};

/// Error raised when a layered configuration cannot be assembled
pub type ConfigError = config::ConfigError;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Refresh-token configuration
    #[serde(default)]
    pub refresh_token: RefreshTokenConfig,

    /// Expiry sweep configuration
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            refresh_token: RefreshTokenConfig::default(),
            cleanup: CleanupConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            database: DatabaseConfig::from_env(),
            refresh_token: RefreshTokenConfig::from_env(),
            cleanup: CleanupConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Load configuration layered from the environment's config file and
    /// `SESSION__`-prefixed environment variables
    ///
    /// The file named by [`Environment::config_file`] is optional. Values are
    /// merged on top of [`AppConfig::from_env`], so plain variables such as
    /// `DATABASE_URL` keep working.
    ///
    /// # Example
    /// ```no_run
    /// use session_shared::AppConfig;
    ///
    /// // SESSION__CLEANUP__INTERVAL_SECONDS=60 overrides the sweep interval
    /// let config = AppConfig::load().expect("configuration");
    /// println!("sweeping every {}s", config.cleanup.interval_seconds);
    /// ```
    pub fn load() -> Result<Self, ConfigError> {
        let base = Self::from_env();
        let file = base.environment.config_file();

        let config: Self = config::Config::builder()
            .add_source(config::Config::try_from(&base)?)
            .add_source(config::File::with_name(&file).required(false))
            .add_source(config::Environment::with_prefix("SESSION").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check every section that has constraints beyond its type
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.refresh_token.validate()?;
        self.cleanup.validate()
    }
}
