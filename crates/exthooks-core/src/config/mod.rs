//! Harness configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files and `EXTHOOKS__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section, and every field
//! carries a default so an empty configuration is valid.

pub mod browser;
pub mod discovery;
pub mod extension;
pub mod logging;
pub mod readiness;
pub mod scenarios;

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::browser::BrowserConfig;
pub use self::discovery::{DiscoveryConfig, SelectionStrategy};
pub use self::extension::ExtensionConfig;
pub use self::logging::LoggingConfig;
pub use self::readiness::ReadinessConfig;
pub use self::scenarios::ScenarioConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Environment variable prefix for overrides, e.g.
/// `EXTHOOKS__BROWSER__HEADLESS=true`.
pub const ENV_PREFIX: &str = "EXTHOOKS";

/// Root harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HarnessConfig {
    /// Browser launch settings.
    #[validate(nested)]
    pub browser: BrowserConfig,
    /// Extension bundle settings.
    #[validate(nested)]
    pub extension: ExtensionConfig,
    /// Identity discovery settings.
    #[validate(nested)]
    pub discovery: DiscoveryConfig,
    /// Readiness polling settings.
    #[validate(nested)]
    pub readiness: ReadinessConfig,
    /// End-to-end scenario settings.
    #[validate(nested)]
    pub scenarios: ScenarioConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl HarnessConfig {
    /// Load configuration.
    ///
    /// Merges, in increasing precedence: `config/default.toml`,
    /// `config/<env>.toml`, the explicit `path` (required when given), and
    /// environment variables prefixed with `EXTHOOKS__`.
    pub fn load(path: Option<&Path>, env: &str) -> AppResult<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate_all()?;
        Ok(loaded)
    }

    /// Load a single TOML file with no default layering or environment
    /// overrides.
    pub fn load_file(path: &Path) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate_all()?;
        Ok(loaded)
    }

    /// Run every section's validation rules.
    pub fn validate_all(&self) -> AppResult<()> {
        self.validate()?;

        if self.extension.bundle_dir.as_os_str().is_empty() {
            return Err(AppError::configuration("extension.bundle_dir must not be empty"));
        }
        if self.browser.profile_dir.as_os_str().is_empty() {
            return Err(AppError::configuration("browser.profile_dir must not be empty"));
        }
        Ok(())
    }
}
