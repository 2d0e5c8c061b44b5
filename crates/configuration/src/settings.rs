use core_types::PriceSettings;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent `config.toml` yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prices: PriceSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Default window sizes and benchmark for the analysis commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Trading periods after the event included in each window.
    pub lookforward: usize,
    /// Trading periods before the event included in each window. 0 disables the backward side.
    pub lookbackward: usize,
    /// Benchmark instrument for relative performance.
    pub benchmark: Option<String>,
    /// Group the event distribution by calendar month instead of by day.
    pub group_by_month: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive (overridden by `RUST_LOG`).
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            lookforward: 20,
            lookbackward: 0,
            benchmark: None,
            group_by_month: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
