use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Secret {0} is not configured")]
    MissingSecret(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub ai_engine_url: Option<String>,
    pub ai_engine_timeout: Duration,
    pub max_upload_bytes: usize,
    pub token_ttl_secs: i64,
    pub require_auth: bool,
    pub token_secret: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "8080")?,
            redis_url: optional("REDIS_URL"),
            ai_engine_url: optional("AI_ENGINE_URL"),
            ai_engine_timeout: Duration::from_millis(try_load("AI_ENGINE_TIMEOUT_MS", "10000")?),
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
            token_ttl_secs: try_load("TOKEN_TTL_SECS", "86400")?,
            require_auth: try_load("REQUIRE_AUTH", "true")?,
            token_secret: read_secret("ERP_TOKEN_SECRET")?,
        })
    }

    /// Defaults with an in-memory store and no enrichment service.
    pub fn with_secret(token_secret: impl Into<String>) -> Self {
        Self {
            port: 8080,
            redis_url: None,
            ai_engine_url: None,
            ai_engine_timeout: Duration::from_millis(10_000),
            max_upload_bytes: 10 * 1024 * 1024,
            token_ttl_secs: 86_400,
            require_auth: true,
            token_secret: token_secret.into(),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => {
            info!("{key} not set");
            None
        }
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

fn read_secret(secret_name: &'static str) -> Result<String, ConfigError> {
    let path = format!("/run/secrets/{secret_name}");

    let secret = read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            env::var(secret_name).map(|s| s.trim().to_string())
        })
        .map_err(|_| ConfigError::MissingSecret(secret_name))?;

    if secret.is_empty() {
        return Err(ConfigError::MissingSecret(secret_name));
    }

    Ok(secret)
}
