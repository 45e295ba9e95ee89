//! Centralized configuration for linkcheck.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than at request time.

use std::env;
use std::fmt;

use http_common::AdminSecret;

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Allowed range for generated slug width.
pub const SLUG_WIDTH_RANGE: std::ops::RangeInclusive<usize> = 4..=6;

/// Configuration loaded from environment variables.
///
/// All fields are validated at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared admin bearer secret; admin checks fail closed without it
    pub admin_token: Option<AdminSecret>,
    /// Log format
    pub log_format: LogFormat,
    /// Minimum width of generated slugs (default: 4)
    pub slug_min_width: usize,
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// Fails fast on invalid configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Admin token
        let admin_token = get("ADMIN_TOKEN")
            .filter(|s| !s.is_empty())
            .map(AdminSecret::new);

        // Log format
        let log_format = LogFormat::from_str(&get("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        // Slug width
        let slug_min_width = match get("SLUG_MIN_WIDTH") {
            None => 4,
            Some(raw) => {
                let width: usize = raw.trim().parse().map_err(|_| ConfigError {
                    field: "SLUG_MIN_WIDTH",
                    message: format!("'{}' is not a number", raw),
                })?;
                if !SLUG_WIDTH_RANGE.contains(&width) {
                    return Err(ConfigError {
                        field: "SLUG_MIN_WIDTH",
                        message: format!(
                            "must be between {} and {}",
                            SLUG_WIDTH_RANGE.start(),
                            SLUG_WIDTH_RANGE.end()
                        ),
                    });
                }
                width
            }
        };

        Ok(Self {
            admin_token,
            log_format,
            slug_min_width,
        })
    }

    /// Log warnings about insecure configuration.
    pub fn warn_if_insecure(&self) {
        match &self.admin_token {
            None => tracing::warn!(
                "ADMIN_TOKEN not set: every admin credential check will be denied."
            ),
            Some(token) if !token.is_usable() => tracing::warn!(
                min_len = http_common::auth::MIN_SECRET_LEN,
                "ADMIN_TOKEN is too short: every admin credential check will be denied."
            ),
            Some(_) => {}
        }
    }
}
