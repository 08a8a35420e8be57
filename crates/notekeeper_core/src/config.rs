//! Client runtime configuration.
//!
//! # Responsibility
//! - Resolve where the notes API lives and how the client talks to it.
//! - Read the process-wide API base override exactly once.
//!
//! # Invariants
//! - `NOTES_API_BASE` is read at most once per process; later changes to the
//!   environment are ignored.
//! - An empty override falls back to `/api`.
//! - A relative base is joined onto `origin`; an absolute `http(s)://` base
//!   is used as-is.

use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "/api";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8080";
pub const API_BASE_ENV: &str = "NOTES_API_BASE";
pub const API_ORIGIN_ENV: &str = "NOTES_API_ORIGIN";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

static RUNTIME_API_BASE: Lazy<String> =
    Lazy::new(|| resolve_api_base(std::env::var(API_BASE_ENV).ok().as_deref()));

/// Returns the process-wide API base path.
pub fn runtime_api_base() -> &'static str {
    RUNTIME_API_BASE.as_str()
}

/// Applies the base-path fallback rule to an optional override.
pub fn resolve_api_base(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_API_BASE.to_string(),
    }
}

/// Configuration validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidOrigin(String),
    ZeroDuration(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOrigin(value) => {
                write!(f, "origin must start with http:// or https://, got `{value}`")
            }
            Self::ZeroDuration(field) => write!(f, "{field} must be greater than zero"),
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by the store client and coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme + host (+ port) used when `api_base` is relative.
    pub origin: String,
    /// API base path (`/api`) or absolute URL.
    pub api_base: String,
    /// Per-request timeout for remote calls.
    pub request_timeout: Duration,
    /// Quiescence window for search-as-you-type.
    pub search_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    /// Builds configuration from the process environment.
    pub fn from_env() -> Self {
        let origin = std::env::var(API_ORIGIN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        Self {
            origin,
            api_base: runtime_api_base().to_string(),
            ..Self::default()
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = resolve_api_base(Some(api_base.into().as_str()));
        self
    }

    /// Checks origin shape and non-zero durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_absolute_http(&self.origin) {
            return Err(ConfigError::InvalidOrigin(self.origin.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request_timeout"));
        }
        if self.search_debounce.is_zero() {
            return Err(ConfigError::ZeroDuration("search_debounce"));
        }
        Ok(())
    }

    /// Absolute API base URL without a trailing slash.
    pub fn api_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        if is_absolute_http(base) {
            return base.to_string();
        }
        format!(
            "{}/{}",
            self.origin.trim_end_matches('/'),
            base.trim_start_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }
}

fn is_absolute_http(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
