//! services/client/src/config.rs
//!
//! Client configuration, loaded from environment variables. Credentials have
//! no defaults.

use flash_core::Timeouts;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which generative-text API turns pasted text into questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationProvider {
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
    OpenAi {
        api_key: String,
        model: String,
    },
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// `Err` holds the reason generation is unavailable, e.g. a missing key.
    pub generation: Result<GenerationProvider, ConfigError>,
    pub timeouts: Timeouts,
    pub log_level: Level,
}

impl ClientConfig {
    /// Loads configuration from the process environment and, outside tests, `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    ///
    /// A missing generator credential is not fatal here: listing and deleting
    /// need no generator, so the problem is kept in `generation`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let provider = lookup("GENERATION_PROVIDER").unwrap_or_else(|| "gemini".to_string());
        let generation = match provider.to_lowercase().as_str() {
            "gemini" => lookup("GEMINI_API_KEY")
                .map(|api_key| GenerationProvider::Gemini {
                    api_key,
                    model: lookup("GEMINI_MODEL")
                        .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
                    base_url: lookup("GEMINI_BASE_URL")
                        .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                })
                .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string())),
            "openai" => lookup("OPENAI_API_KEY")
                .map(|api_key| GenerationProvider::OpenAi {
                    api_key,
                    model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                })
                .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string())),
            other => {
                return Err(ConfigError::InvalidValue(
                    "GENERATION_PROVIDER".to_string(),
                    format!("'{}' is not one of gemini, openai", other),
                ))
            }
        };

        let defaults = Timeouts::default();
        let timeouts = Timeouts {
            generation: seconds(&lookup, "GENERATION_TIMEOUT_SECS", defaults.generation)?,
            store: seconds(&lookup, "STORE_TIMEOUT_SECS", defaults.store)?,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            generation,
            timeouts,
            log_level,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidValue(
                key.to_string(),
                format!("'{}' is not a positive number of seconds", raw),
            )),
            Ok(secs) => Ok(Duration::from_secs(secs)),
        },
    }
}
