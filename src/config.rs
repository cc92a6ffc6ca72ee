use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;
use crate::driver::Stage;
use crate::error::{AnalyticsError, Result};

/// Runtime configuration, read from `config.toml`.
///
/// Every section falls back to its defaults, so a partial file only has to
/// name what it changes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub cleaning: CleaningConfig,
    pub weekly: WeeklyConfig,
    pub eda: EdaConfig,
    pub report: ReportConfig,
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Raw product catalog
    pub input: PathBuf,
    /// Cleaned product catalog written by the clean stage
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeeklyConfig {
    /// Interaction log (user, product, interaction type, timestamp)
    pub events: PathBuf,
    /// Product catalog joined onto the events, normally the clean stage output
    pub products: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdaConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Render SVG charts in addition to the console tables
    pub charts: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Stages executed by `run`, in order
    pub stages: Vec<Stage>,
    /// Where the metrics snapshot and run summary are written
    pub output_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_dir: PathBuf::from("logs") }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(constants::DEFAULT_PRODUCTS_PATH),
            output: PathBuf::from(constants::DEFAULT_CLEANED_PRODUCTS_PATH),
        }
    }
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            events: PathBuf::from(constants::DEFAULT_EVENTS_PATH),
            products: PathBuf::from(constants::DEFAULT_CLEANED_PRODUCTS_PATH),
            output_dir: PathBuf::from("data/processed"),
        }
    }
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(constants::DEFAULT_CONTENT_PATH),
            output_dir: PathBuf::from("data"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { charts: true }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            stages: vec![Stage::Clean, Stage::Weekly, Stage::Eda],
            output_dir: PathBuf::from("data/processed"),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Resolution order: the explicit `path`, then `CATALOG_ANALYTICS_CONFIG`,
    /// then `config.toml` in the working directory. An explicitly named file
    /// must exist; the implicit `config.toml` falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(constants::CONFIG_ENV_VAR).ok().map(PathBuf::from));

        match explicit {
            Some(config_path) => Self::from_file(&config_path),
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    info!("No {} found, using built-in defaults", constants::DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AnalyticsError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.driver.stages.is_empty() {
            return Err(AnalyticsError::Config("driver.stages must name at least one stage".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [cleaning]
            input = "raw/products.csv"

            [report]
            charts = false
            "#,
        )
        .unwrap();

        assert_eq!(config.cleaning.input, PathBuf::from("raw/products.csv"));
        assert_eq!(config.cleaning.output, PathBuf::from(constants::DEFAULT_CLEANED_PRODUCTS_PATH));
        assert!(!config.report.charts);
        assert_eq!(config.driver.stages, vec![Stage::Clean, Stage::Weekly, Stage::Eda]);
    }

    #[test]
    fn test_stage_list_is_parsed() {
        let config = Config::from_toml(
            r#"
            [driver]
            stages = ["eda"]
            "#,
        )
        .unwrap();
        assert_eq!(config.driver.stages, vec![Stage::Eda]);
    }

    #[test]
    fn test_empty_stage_list_is_rejected() {
        let err = Config::from_toml("[driver]\nstages = []\n").unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/catalog.toml"))).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }
}
