use std::{net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub bind_addr: SocketAddr,
    pub recaptcha: RecaptchaConfig,
    pub model: ModelConfig,
    pub liveness: LivenessConfig,
    pub cache: CacheConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    pub site_key: String,
    pub secret_key: String,
    pub verify_url: String,
    pub timeout: Duration,
    /// Lifetime of the `recaptcha_verified` cookie handed out after a successful check.
    pub cookie_max_age: Duration,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LivenessConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub ttl: Duration,
    pub purge_cron: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
