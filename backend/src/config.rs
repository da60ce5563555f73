//! Configuration management for the FarmGuard AI backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FARMGUARD_ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Upload storage configuration
    pub storage: StorageConfig,

    /// Model artifact locations
    pub models: ModelsConfig,

    /// External LLM configuration
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,

    /// Delay before an upload is removed, in milliseconds
    pub cleanup_delay_ms: u64,

    /// Remove uploads left over from a previous run at startup
    pub sweep_on_startup: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    /// Crop classifier weights
    pub crop_path: PathBuf,

    /// Disease classifier weights
    pub disease_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// API key; the LLM path is disabled without one
    pub api_key: Option<String>,

    /// Chat completions endpoint
    pub endpoint: String,

    /// Model name sent with each request
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StorageConfig {
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_ms)
    }
}

impl LlmConfig {
    /// API key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FARMGUARD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5001)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.max_upload_bytes", 16 * 1024 * 1024)?
            .set_default("storage.upload_dir", "static")?
            .set_default("storage.cleanup_delay_ms", 1000)?
            .set_default("storage.sweep_on_startup", true)?
            .set_default("models.crop_path", "model/crop_model.mpk")?
            .set_default("models.disease_path", "model/disease_model.mpk")?
            .set_default("llm.endpoint", "https://api.openai.com/v1/chat/completions")?
            .set_default("llm.model", "gpt-4-turbo")?
            .set_default("llm.timeout_secs", 30)?;

        // The conventional OpenAI variable works without the prefix
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.set_default("llm.api_key", key)?;
        }

        let config = builder
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FARMGUARD_ prefix)
            .add_source(
                Environment::with_prefix("FARMGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            models: ModelsConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            host: "0.0.0.0".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static"),
            cleanup_delay_ms: 1000,
            sweep_on_startup: true,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            crop_path: PathBuf::from("model/crop_model.mpk"),
            disease_path: PathBuf::from("model/disease_model.mpk"),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 30,
        }
    }
}
