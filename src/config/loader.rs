use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use super::env::{
    AppConfig, CacheBackend, CacheConfig, ConfigError, DirectoryConfig, LivenessConfig,
    LoggingConfig, ModelConfig, RecaptchaConfig,
};

pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_LIVENESS_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RECAPTCHA_TIMEOUT_MS: u64 = 10_000;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);
        let secret_key = vars.required("SECRET_KEY")?;

        let bind_addr = match vars.get("BIND_ADDR") {
            Some(value) => value.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value,
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 5000)),
        };

        let recaptcha = RecaptchaConfig {
            site_key: vars.required("RECAPTCHA_SITE_KEY")?,
            secret_key: vars.required("RECAPTCHA_SECRET_KEY")?,
            verify_url: vars
                .get("RECAPTCHA_VERIFY_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| RECAPTCHA_VERIFY_URL.to_string()),
            timeout: Duration::from_millis(vars.parse_u64(
                "RECAPTCHA_TIMEOUT_MS",
                DEFAULT_RECAPTCHA_TIMEOUT_MS,
            )?),
            cookie_max_age: Duration::from_secs(vars.parse_u64(
                "VERIFIED_COOKIE_MAX_AGE_SECS",
                30 * 24 * 3600,
            )?),
        };

        let model = ModelConfig {
            path: PathBuf::from(
                vars.get("MODEL_PATH").unwrap_or_else(|| "models/url_model.json".to_string()),
            ),
        };

        let liveness = LivenessConfig {
            timeout: Duration::from_millis(vars.parse_u64(
                "LIVENESS_TIMEOUT_MS",
                DEFAULT_LIVENESS_TIMEOUT_MS,
            )?),
        };

        let cache = CacheConfig {
            backend: parse_backend(vars.get("CACHE_BACKEND"))?,
            ttl: Duration::from_secs(vars.parse_u64("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?),
            purge_cron: vars
                .get("CACHE_PURGE_CRON")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "0 */10 * * * *".to_string()),
        };

        let directories = DirectoryConfig {
            logs_dir: vars.get("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
            data_dir: vars.get("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            db_filename: vars.get("DB_FILENAME").unwrap_or_else(|| "phishshield.db".to_string()),
        };

        let logging = LoggingConfig {
            level: vars.get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            secret_key,
            bind_addr,
            recaptcha,
            model,
            liveness,
            cache,
            directories,
            logging,
        })
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            secret_key: "test-secret".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            recaptcha: RecaptchaConfig {
                site_key: "site-key".to_string(),
                secret_key: "captcha-secret".to_string(),
                verify_url: RECAPTCHA_VERIFY_URL.to_string(),
                timeout: Duration::from_millis(DEFAULT_RECAPTCHA_TIMEOUT_MS),
                cookie_max_age: Duration::from_secs(3600),
            },
            model: ModelConfig {
                path: PathBuf::from("models/url_model.json"),
            },
            liveness: LivenessConfig {
                timeout: Duration::from_millis(DEFAULT_LIVENESS_TIMEOUT_MS),
            },
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                purge_cron: "0 */10 * * * *".to_string(),
            },
            directories: DirectoryConfig {
                logs_dir: "logs".to_string(),
                data_dir: "data".to_string(),
                db_filename: "phishshield.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(key))
    }

    fn parse_u64(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        match self.get(key) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }
}

fn parse_backend(raw: Option<String>) -> Result<CacheBackend, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(CacheBackend::Sqlite),
        Some(value) if value.eq_ignore_ascii_case("sqlite") => Ok(CacheBackend::Sqlite),
        Some(value) if value.eq_ignore_ascii_case("memory") => Ok(CacheBackend::Memory),
        Some(value) => Err(ConfigError::Invalid {
            key: "CACHE_BACKEND",
            value: value.to_string(),
        }),
    }
}
