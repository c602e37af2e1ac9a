use crate::cli::{Cli, Commands, OutputFormat};
use crate::logging::{LOG_LEVELS, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

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

const ENV_PREFIX: &str = "LDD_RULES_";
const MAX_WORKERS: usize = 1024;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    pub files: FileConfig,
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_address: String,
    /// Worker threads (defaults to the CPU count)
    pub workers: Option<usize>,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormatConfig,
    pub verbose: bool,
    /// Errors only
    pub quiet: bool,
}

/// File discovery configuration for `check`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// File extensions to process
    pub extensions: Vec<String>,
    /// Maximum directory depth (unlimited when unset)
    pub max_depth: Option<usize>,
    /// Files checked concurrently (defaults to the CPU count)
    pub jobs: Option<usize>,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            workers: None,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            max_depth: None,
            jobs: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {}{} value: {}", ENV_PREFIX, key, value)))
}

fn split_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = match &cli.config {
            Some(config_path) => Self::load_from_file(config_path).await?,
            None => Self::find_config_file().await?.unwrap_or_default(),
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
            None => match toml::from_str::<Config>(&content) {
                Ok(config) => Ok(config),
                Err(_) => Ok(serde_json::from_str(&content)?),
            },
        }
    }

    /// Find configuration file in the current directory, then the user config directory
    pub async fn find_config_file() -> Result<Option<Config>> {
        let mut candidates: Vec<PathBuf> = Self::config_file_names()
            .iter()
            .map(PathBuf::from)
            .collect();
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("ldd-rules");
            candidates.extend(Self::config_file_names().iter().map(|name| app_dir.join(name)));
        }

        for path in candidates {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::debug!(path = %path.display(), "loading configuration file");
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        Ok(None)
    }

    fn config_file_names() -> [&'static str; 4] {
        [
            "ldd-rules.toml",
            "ldd-rules.json",
            ".ldd-rules.toml",
            ".ldd-rules.json",
        ]
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
        let var = |key: &str| env.get(&format!("{ENV_PREFIX}{key}"));

        // Server settings
        if let Some(bind) = var("BIND") {
            config.server.bind_address = bind.trim().to_string();
        }
        if let Some(workers) = var("WORKERS") {
            config.server.workers = Some(parse_env("WORKERS", &workers)?);
        }
        if let Some(limit) = var("MAX_BODY_BYTES") {
            config.server.max_body_bytes = parse_env("MAX_BODY_BYTES", &limit)?;
        }

        // Logging settings
        if let Some(level) = var("LOG_LEVEL") {
            config.logging.level = level.trim().to_lowercase();
        }
        if let Some(format) = var("LOG_FORMAT") {
            config.logging.format = parse_env("LOG_FORMAT", &format)?;
        }

        // Output settings
        if let Some(format) = var("FORMAT") {
            config.output.format = match format.trim().to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid {}FORMAT value: {}",
                        ENV_PREFIX, format
                    )));
                }
            };
        }

        // File settings
        if let Some(extensions) = var("EXTENSIONS") {
            config.files.extensions = split_extensions(&extensions);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }
        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if let Some(level) = &cli.log_level {
            config.logging.level = level.to_lowercase();
        }
        if let Some(format) = cli.log_format {
            config.logging.format = format;
        }

        match &cli.command {
            Commands::Serve {
                bind,
                workers,
                max_body_bytes,
            } => {
                if let Some(bind) = bind {
                    config.server.bind_address = bind.clone();
                }
                if workers.is_some() {
                    config.server.workers = *workers;
                }
                if let Some(limit) = max_body_bytes {
                    config.server.max_body_bytes = *limit;
                }
            }
            Commands::Check {
                extensions,
                max_depth,
                jobs,
                ..
            } => {
                if let Some(extensions) = extensions {
                    config.files.extensions = split_extensions(&extensions.join(","));
                }
                if max_depth.is_some() {
                    config.files.max_depth = *max_depth;
                }
                if jobs.is_some() {
                    config.files.jobs = *jobs;
                }
            }
            Commands::Transform { .. } | Commands::Coverage { .. } | Commands::Enums { .. } => {}
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Bind address must not be empty".to_string(),
            ));
        }

        if let Some(workers) = config.server.workers {
            if workers == 0 {
                return Err(ConfigError::Validation(
                    "Number of workers must be greater than 0".to_string(),
                ));
            }
            if workers > MAX_WORKERS {
                return Err(ConfigError::Validation(format!(
                    "Number of workers cannot exceed {}",
                    MAX_WORKERS
                )));
            }
        }

        if config.server.max_body_bytes == 0 {
            return Err(ConfigError::Validation(
                "Request body limit must be greater than 0".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level: {}",
                config.logging.level
            )));
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if config.files.jobs == Some(0) {
            return Err(ConfigError::Validation(
                "Number of jobs must be greater than 0".to_string(),
            ));
        }

        if config.files.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "At least one file extension must be specified".to_string(),
            ));
        }

        for ext in &config.files.extensions {
            if ext.is_empty() || ext.contains('/') || ext.contains('\\') || ext.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "Invalid file extension: {}",
                    ext
                )));
            }
        }

        Ok(())
    }

    /// Get the effective HTTP worker count
    pub fn get_worker_count(config: &Config) -> usize {
        config.server.workers.unwrap_or_else(num_cpus::get)
    }

    /// Get the effective number of concurrent file checks
    pub fn get_job_count(config: &Config) -> usize {
        config.files.jobs.unwrap_or_else(num_cpus::get)
    }
}
