//! Configuration for the web server.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Directory holding the page scripts and styles served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded images are written to.
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    /// Request body limit in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_bytes: default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// PyTorch state dict with the trained ConvNet parameters.
    #[serde(default = "default_weights_path")]
    pub weights_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: default_weights_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upload: UploadConfig::default(),
            model: ModelConfig::default(),
            logging: LoggingConfig::default(),
            static_dir: default_static_dir(),
        }
    }
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_upload_dir() -> String {
    "uploads".to_string()
}
fn default_max_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_weights_path() -> String {
    "./model_batch_16.pth".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_static_dir() -> String {
    "web/static".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (KANA__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(ConfigLoader::builder().add_source(File::with_name("config").required(false)))
    }

    fn load_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder
            .add_source(
                Environment::with_prefix("KANA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
