use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use core_types::PriceSettings;
pub use settings::{AnalysisSettings, Config, LoggingSettings};

/// Prefix for environment overrides, e.g. `EVENT_STUDY__ANALYSIS__LOOKFORWARD=10`.
pub const ENV_PREFIX: &str = "EVENT_STUDY";

/// Loads the application configuration.
///
/// Sources, later ones winning: built-in defaults, the TOML file at `path` (if
/// it exists), then `EVENT_STUDY__SECTION__KEY` environment variables. The
/// result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects configurations that cannot drive an analysis.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.prices.padding_periods == 0 {
        return Err(ConfigError::ValidationError(
            "prices.padding_periods must be at least 1".to_string(),
        ));
    }
    if config.analysis.lookforward == 0 && config.analysis.lookbackward == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.lookforward and analysis.lookbackward cannot both be 0".to_string(),
        ));
    }
    if let Some(benchmark) = &config.analysis.benchmark {
        if benchmark.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.benchmark must not be blank".to_string(),
            ));
        }
    }
    logging::level_filter(&config.logging.level)?;
    Ok(())
}
