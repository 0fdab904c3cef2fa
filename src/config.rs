use crate::cli::Cli;
use crate::reader::DEFAULT_STREAMING_THRESHOLD;
use crate::render::DEFAULT_TITLE;
use crate::timestamp::{DEFAULT_UTC_OFFSET_HOURS, TimestampNormalizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of files processed concurrently
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 100;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

/// Where reports are read from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding .xml / .zip / .gz reports
    pub directory: PathBuf,
}

/// Where and how the HTML document is written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output HTML path
    pub path: PathBuf,
    /// Page title and heading
    pub title: String,
}

/// Pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Files processed concurrently per batch
    pub batch_size: usize,
    /// Files larger than this many bytes are read in chunks
    pub streaming_threshold_bytes: u64,
    /// Offset applied to report timestamps for display
    pub utc_offset_hours: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("report"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("report.html"),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            streaming_threshold_bytes: DEFAULT_STREAMING_THRESHOLD,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = if let Some(config_path) = &cli.config {
            Self::load_from_file(config_path).await?
        } else {
            Self::find_config_file().await?.unwrap_or_default()
        };

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "dmarc-report.toml",
            "dmarc-report.json",
            ".dmarc-report.toml",
            ".dmarc-report.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("dmarc-report");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(dir) = env.get("DMARC_REPORT_INPUT_DIR") {
            config.input.directory = PathBuf::from(dir);
        }

        if let Some(output) = env.get("DMARC_REPORT_OUTPUT") {
            config.output.path = PathBuf::from(output);
        }

        if let Some(batch_size) = env.get("DMARC_REPORT_BATCH_SIZE") {
            config.processing.batch_size = batch_size.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid DMARC_REPORT_BATCH_SIZE value: {}",
                    batch_size
                ))
            })?;
        }

        if let Some(threshold) = env.get("DMARC_REPORT_STREAMING_THRESHOLD") {
            config.processing.streaming_threshold_bytes = threshold.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid DMARC_REPORT_STREAMING_THRESHOLD value: {}",
                    threshold
                ))
            })?;
        }

        if let Some(offset) = env.get("DMARC_REPORT_UTC_OFFSET") {
            config.processing.utc_offset_hours = offset.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid DMARC_REPORT_UTC_OFFSET value: {}",
                    offset
                ))
            })?;
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(input) = &cli.input {
            config.input.directory = input.clone();
        }
        if let Some(output) = &cli.output {
            config.output.path = output.clone();
        }
        if let Some(batch_size) = cli.batch_size {
            config.processing.batch_size = batch_size;
        }
        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        let batch_size = config.processing.batch_size;
        if batch_size == 0 {
            return Err(ConfigError::Validation(
                "Batch size must be greater than 0".to_string(),
            ));
        }
        if batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::Validation(format!(
                "Batch size cannot exceed {}",
                MAX_BATCH_SIZE
            )));
        }

        if config.processing.streaming_threshold_bytes == 0 {
            return Err(ConfigError::Validation(
                "Streaming threshold must be greater than 0".to_string(),
            ));
        }

        if TimestampNormalizer::new(config.processing.utc_offset_hours).is_none() {
            return Err(ConfigError::Validation(format!(
                "UTC offset must be between -23 and 23 hours, got {}",
                config.processing.utc_offset_hours
            )));
        }

        if config.output.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Output title cannot be empty".to_string(),
            ));
        }

        if config.output.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "Output path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Timestamp normalizer for the configured offset
    pub fn timestamp_normalizer(config: &Config) -> TimestampNormalizer {
        TimestampNormalizer::new(config.processing.utc_offset_hours).unwrap_or_default()
    }
}
