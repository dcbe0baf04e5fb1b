//! Harness configuration loaded from the environment
//!
//! Environment variables:
//! - PROVISIONING_URL: server base URL (default: https://localhost)
//! - PROVISIONING_USERNAME / PROVISIONING_PASSWORD: basic credentials (optional, both or neither)
//! - PROVISIONING_VERIFY_TLS: verify server certificates (default: true)
//! - PROVISIONING_TIMEOUT_SECS: per-request timeout (default: 30)
//! - PROVISIONING_LOG_LEVEL: trace/debug/info/warn/error (default: info)
//! - PROVISIONING_LOG_FORMAT: text or json (default: text)

use crate::{Error, Result};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://localhost";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Basic credentials forwarded to the HTTP client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "PROVISIONING_LOG_FORMAT must be one of [text, json], got '{other}'"
            ))),
        }
    }
}

/// Configuration for talking to a provisioning server
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Server base URL, without trailing slash
    pub base_url: String,
    /// Optional basic credentials
    pub credentials: Option<Credentials>,
    /// Verify TLS certificates
    pub verify_tls: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Max log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl HarnessConfig {
    /// Config pointing at `base_url` with every other setting defaulted
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            credentials: None,
            verify_tls: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let base_url = var("PROVISIONING_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "PROVISIONING_URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let credentials = match (var("PROVISIONING_USERNAME"), var("PROVISIONING_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "PROVISIONING_USERNAME and PROVISIONING_PASSWORD must be set together"
                        .to_string(),
                ));
            }
        };

        let verify_tls = match var("PROVISIONING_VERIFY_TLS") {
            Some(raw) => parse_bool("PROVISIONING_VERIFY_TLS", &raw)?,
            None => true,
        };

        let timeout_secs = match var("PROVISIONING_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(Error::Config(format!(
                        "PROVISIONING_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    )));
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let log_level = var("PROVISIONING_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        crate::telemetry::parse_log_level(&log_level)?;

        let log_format = match var("PROVISIONING_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Text,
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            credentials,
            verify_tls,
            timeout: Duration::from_secs(timeout_secs),
            log_level,
            log_format,
        })
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!(
            "{name} must be a boolean (true/false/1/0), got '{raw}'"
        ))),
    }
}
