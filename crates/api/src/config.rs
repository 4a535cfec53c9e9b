use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use cipherswarm_coordinator::config::DEFAULT_DEVICE_BUCKET_SECS;
use cipherswarm_coordinator::CoordinatorConfig;
use cipherswarm_core::liveness::LivenessPolicy;

/// Default seconds between liveness passes when a deadline is configured.
const DEFAULT_LIVENESS_INTERVAL_SECS: u64 = 60;

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Bearer token for the admin routes. `None` disables them.
    pub admin_api_token: Option<String>,
    /// Liveness reaping; `None` unless `AGENT_LIVENESS_DEADLINE_SECS` is set.
    pub liveness: Option<LivenessPolicy>,
    /// Width of device performance buckets in seconds (default: `600`).
    pub device_bucket_secs: i64,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `DATABASE_URL`                 | required                |
    /// | `ADMIN_API_TOKEN`              | unset (admin disabled)  |
    /// | `AGENT_LIVENESS_DEADLINE_SECS` | unset (reaper disabled) |
    /// | `AGENT_LIVENESS_INTERVAL_SECS` | `60`                    |
    /// | `DEVICE_PERF_BUCKET_SECS`      | `600`                   |
    /// | `LOG_FORMAT`                   | `text`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_var("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let request_timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", 30)?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let admin_api_token = std::env::var("ADMIN_API_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let liveness = match std::env::var("AGENT_LIVENESS_DEADLINE_SECS") {
            Ok(raw) => {
                let deadline_secs: u64 = parse_value("AGENT_LIVENESS_DEADLINE_SECS", &raw)?;
                let interval_secs: u64 =
                    parse_var("AGENT_LIVENESS_INTERVAL_SECS", DEFAULT_LIVENESS_INTERVAL_SECS)?;
                let policy = LivenessPolicy::new(
                    Duration::from_secs(deadline_secs),
                    Duration::from_secs(interval_secs),
                )
                .map_err(|e| ConfigError::Invalid {
                    name: "AGENT_LIVENESS_DEADLINE_SECS",
                    value: raw,
                    reason: e.to_string(),
                })?;
                Some(policy)
            }
            Err(_) => None,
        };

        let device_bucket_secs: i64 =
            parse_var("DEVICE_PERF_BUCKET_SECS", DEFAULT_DEVICE_BUCKET_SECS)?;
        if device_bucket_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "DEVICE_PERF_BUCKET_SECS",
                value: device_bucket_secs.to_string(),
                reason: "must be positive".into(),
            });
        }

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("text") | Err(_) => LogFormat::Text,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected 'text' or 'json'".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            admin_api_token,
            liveness,
            device_bucket_secs,
            log_format,
        })
    }

    /// The coordinator tunables carried by this configuration.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            device_bucket_secs: self.device_bucket_secs,
            liveness: self.liveness,
        }
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
