//! Configuration for the nlsql binary
//!
//! Loads configuration from:
//! 1. config.yaml - operational settings (port, model, schema source, logging)
//! 2. .env file - secrets (API keys)
//!
//! Environment variables always override config.yaml values. A missing
//! config file is not an error; every section has defaults.

use nlsql_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which backend produces SQL candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    /// No model: heuristic translation only
    None,
}

impl ModelProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "openai" => Some(ModelProvider::OpenAi),
            "none" => Some(ModelProvider::None),
            _ => None,
        }
    }
}

/// Candidate generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub name: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            name: "gpt-4o-mini".to_string(),
            max_output_tokens: 196,
            temperature: 0.0,
        }
    }
}

/// Where schemas come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Schema document (JSON)
    pub path: PathBuf,

    /// Directory of SQLite files to introspect; takes precedence over `path`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_dir: Option<PathBuf>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/sample_schema.json"),
            database_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub schema: SchemaConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_yaml_str(&std::fs::read_to_string(path)?)?
        } else {
            Config::default()
        };

        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup` (the process environment in [`Config::load`])
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("NLSQL_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("NLSQL_SERVER_PORT") {
            self.server.port = parse_var("NLSQL_SERVER_PORT", port)?;
        }

        if let Some(name) = lookup("NLSQL_MODEL") {
            self.model.name = name;
        }
        if let Some(provider) = lookup("NLSQL_MODEL_PROVIDER") {
            self.model.provider =
                ModelProvider::parse(&provider).ok_or_else(|| ConfigError::InvalidEnvVar {
                    var: "NLSQL_MODEL_PROVIDER".to_string(),
                    value: provider,
                })?;
        }

        if let Some(path) = lookup("NLSQL_SCHEMA_PATH") {
            self.schema.path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("NLSQL_DATABASE_DIR") {
            self.schema.database_dir = Some(PathBuf::from(dir));
        }
        if let Some(top_k) = lookup("NLSQL_TOP_K") {
            self.pipeline.top_k = parse_var("NLSQL_TOP_K", top_k)?;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(output) = lookup("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.logging.directory = dir;
        }

        Ok(())
    }

    /// Get OpenAI API key from environment (usually via .env)
    pub fn openai_api_key() -> Result<String, ConfigError> {
        std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        value,
    })
}
