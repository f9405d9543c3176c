pub mod env;
mod loader;

pub use env::{
    AppConfig, CacheBackend, DirectoryConfig, LivenessConfig, LoggingConfig, RecaptchaConfig,
};
pub use loader::load_config;
