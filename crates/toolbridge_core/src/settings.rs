//! Environment-driven settings.
//!
//! [`Settings::from_env`] loads a `.env` file (if present) and reads the
//! process environment. [`Settings::from_lookup`] runs the same parsing and
//! validation against any key lookup, which keeps tests away from global
//! process state.
//!
//! | Variable | Default | Constraint |
//! |----------|---------|------------|
//! | `APP_NAME` | `toolbridge` | |
//! | `DEBUG` | `false` | boolean |
//! | `LOG_LEVEL` | `info` | trace, debug, info, warn, error |
//! | `OPENAI_API_KEY` | unset | `sk-` prefix, at least 20 characters |
//! | `HTTP_TIMEOUT` | `30` | 1-300 seconds |
//! | `HTTP_MAX_RETRIES` | `3` | 0-10 |
//! | `LLM_MAX_RETRIES` | `3` | 0-10 |
//! | `LLM_MODEL` | `openai/gpt-4o-mini` | `provider/model` |
//! | `HOST` | `0.0.0.0` | |
//! | `PORT` | `8000` | 1-65535 |

use crate::tracing::TracingConfig;
use ::tracing::Level;
use core::time::Duration;
use thiserror::Error;
use toolbridge_http::RetryPolicy;

/// Default model identifier.
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-4o-mini";

/// A setting could not be parsed or failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The variable is set to an unusable value.
    #[error("invalid {var}: {reason}")]
    InvalidValue {
        /// Environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A value needed by the caller is not configured.
    #[error("{0} is not set")]
    Missing(&'static str),
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            reason: reason.into(),
        }
    }
}

/// Validated application settings.
#[derive(Clone, PartialEq)]
pub struct Settings {
    /// Application name, used in logs.
    pub app_name: String,
    /// Debug mode; forces debug-level logging.
    pub debug: bool,
    /// Log level.
    pub log_level: Level,
    /// `OpenAI` API key.
    pub openai_api_key: Option<String>,
    /// Default HTTP timeout.
    pub http_timeout: Duration,
    /// Retries for outbound HTTP calls.
    pub http_max_retries: u32,
    /// Retries for LLM calls.
    pub llm_max_retries: u32,
    /// Model identifier in `provider/model` form.
    pub llm_model: String,
    /// Bind host for a serving front end.
    pub host: String,
    /// Bind port for a serving front end.
    pub port: u16,
}

impl core::fmt::Debug for Settings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("http_timeout", &self.http_timeout)
            .field("http_max_retries", &self.http_max_retries)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("llm_model", &self.llm_model)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "toolbridge".to_string(),
            debug: false,
            log_level: Level::INFO,
            openai_api_key: None,
            http_timeout: Duration::from_secs(30),
            http_max_retries: 3,
            llm_max_retries: 3,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Loads `.env` and reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for the first invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; real environment variables win.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for the first invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let debug = get("DEBUG")
            .map(|value| parse_bool("DEBUG", &value))
            .transpose()?
            .unwrap_or(defaults.debug);

        let log_level = get("LOG_LEVEL")
            .map(|value| parse_level(&value))
            .transpose()?
            .unwrap_or(defaults.log_level);

        let openai_api_key = get("OPENAI_API_KEY")
            .map(|key| validate_openai_key(&key).map(|()| key))
            .transpose()?;

        let http_timeout = get("HTTP_TIMEOUT")
            .map(|value| parse_timeout(&value))
            .transpose()?
            .unwrap_or(defaults.http_timeout);

        let http_max_retries = get("HTTP_MAX_RETRIES")
            .map(|value| parse_retries("HTTP_MAX_RETRIES", &value))
            .transpose()?
            .unwrap_or(defaults.http_max_retries);

        let llm_max_retries = get("LLM_MAX_RETRIES")
            .map(|value| parse_retries("LLM_MAX_RETRIES", &value))
            .transpose()?
            .unwrap_or(defaults.llm_max_retries);

        let llm_model = get("LLM_MODEL").unwrap_or(defaults.llm_model);
        if !llm_model.contains('/') {
            return Err(ConfigError::invalid(
                "LLM_MODEL",
                format!("expected 'provider/model', got '{llm_model}'"),
            ));
        }

        let port = get("PORT")
            .map(|value| {
                value
                    .parse::<u16>()
                    .ok()
                    .filter(|port| *port > 0)
                    .ok_or_else(|| ConfigError::invalid("PORT", format!("'{value}' is not a port in 1-65535")))
            })
            .transpose()?
            .unwrap_or(defaults.port);

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            debug,
            log_level,
            openai_api_key,
            http_timeout,
            http_max_retries,
            llm_max_retries,
            llm_model,
            host: get("HOST").unwrap_or(defaults.host),
            port,
        })
    }

    /// The configured `OpenAI` key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `OPENAI_API_KEY` is unset.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    /// Retry policy for outbound HTTP calls.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.http_max_retries)
    }

    /// Retry policy for LLM calls: exponential waits between 2 and 10
    /// seconds.
    #[must_use]
    pub fn llm_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.llm_max_retries)
            .with_initial_backoff(Duration::from_secs(2))
            .with_max_backoff(Duration::from_secs(10))
    }

    /// Tracing configuration; debug mode forces the debug level.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let level = if self.debug { Level::DEBUG } else { self.log_level };
        TracingConfig::default().with_level(level)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(var, format!("'{value}' is not a boolean"))),
    }
}

fn parse_level(value: &str) -> Result<Level, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "critical" => Ok(Level::ERROR),
        _ => Err(ConfigError::invalid(
            "LOG_LEVEL",
            format!("'{value}' is not one of trace, debug, info, warn, error"),
        )),
    }
}

fn validate_openai_key(key: &str) -> Result<(), ConfigError> {
    if key.len() < 20 {
        return Err(ConfigError::invalid(
            "OPENAI_API_KEY",
            "must be at least 20 characters",
        ));
    }
    if !key.starts_with("sk-") {
        return Err(ConfigError::invalid("OPENAI_API_KEY", "must start with 'sk-'"));
    }
    Ok(())
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| ConfigError::invalid("HTTP_TIMEOUT", format!("'{value}' is not a number")))?;
    if !(1.0..=300.0).contains(&seconds) {
        return Err(ConfigError::invalid(
            "HTTP_TIMEOUT",
            format!("{seconds} is outside 1-300 seconds"),
        ));
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn parse_retries(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|retries| *retries <= 10)
        .ok_or_else(|| ConfigError::invalid(var, format!("'{value}' is not in 0-10")))
}
