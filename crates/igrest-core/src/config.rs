//! Baseline client configuration applied at factory time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::traits::{AutomationClient, ConfigError};

/// Default per-request timeout budget.
///
/// Kept short so an unreachable upstream fails the HTTP request quickly
/// instead of pinning the caller.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest accepted timezone offset (14 hours, in seconds).
pub const MAX_TIMEZONE_OFFSET: i32 = 14 * 60 * 60;

const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Configuration every new client starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Proxy URL for upstream traffic.
    pub proxy: Option<String>,
    /// Locale code such as `en_US`.
    pub locale: Option<String>,
    /// Timezone offset in seconds east of UTC.
    pub timezone_offset: Option<i32>,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            locale: None,
            timezone_offset: None,
            request_timeout_ms: u64::try_from(DEFAULT_REQUEST_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

impl ClientConfig {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate every field without touching a client.
    ///
    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if let Some(proxy) = &self.proxy {
            validate_proxy(proxy)?;
        }
        if let Some(locale) = &self.locale {
            validate_locale(locale)?;
        }
        if let Some(offset) = self.timezone_offset {
            validate_timezone_offset(offset)?;
        }
        Ok(())
    }

    /// Apply this configuration to a client through its setters.
    ///
    /// # Errors
    /// Returns error if a value is invalid or the client rejects it.
    pub fn apply<C: AutomationClient>(&self, client: &mut C) -> Result<(), ConfigError> {
        self.validate()?;
        client.set_request_timeout(self.request_timeout())?;
        if let Some(proxy) = &self.proxy {
            client.set_proxy(proxy)?;
        }
        if let Some(locale) = &self.locale {
            client.set_locale(locale)?;
        }
        if let Some(offset) = self.timezone_offset {
            client.set_timezone_offset(offset)?;
        }
        Ok(())
    }
}

/// Optional per-request configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOverrides {
    pub proxy: Option<String>,
    pub locale: Option<String>,
    pub timezone_offset: Option<i32>,
}

impl ClientOverrides {
    /// Whether no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.proxy.is_none() && self.locale.is_none() && self.timezone_offset.is_none()
    }

    /// Apply only the overridden fields to a client.
    ///
    /// # Errors
    /// Returns error if an overridden value is invalid.
    pub fn apply<C: AutomationClient>(&self, client: &mut C) -> Result<(), ConfigError> {
        if let Some(proxy) = &self.proxy {
            validate_proxy(proxy)?;
            client.set_proxy(proxy)?;
        }
        if let Some(locale) = &self.locale {
            validate_locale(locale)?;
            client.set_locale(locale)?;
        }
        if let Some(offset) = self.timezone_offset {
            validate_timezone_offset(offset)?;
            client.set_timezone_offset(offset)?;
        }
        Ok(())
    }
}

/// Parse and check a proxy URL.
///
/// # Errors
/// Returns `ConfigError::InvalidProxy` for unparsable URLs, unsupported
/// schemes, or URLs without a host.
pub fn validate_proxy(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidProxy {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Check a locale code of the form `ll_RR` or `ll-RR`.
///
/// # Errors
/// Returns `ConfigError::InvalidLocale` for anything else.
pub fn validate_locale(locale: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidLocale(locale.to_string());

    let (language, region) = locale
        .split_once(['_', '-'])
        .ok_or_else(invalid)?;
    let language_ok =
        (2..=3).contains(&language.len()) && language.chars().all(|c| c.is_ascii_alphabetic());
    let region_ok = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());

    if language_ok && region_ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Check a timezone offset in seconds.
///
/// # Errors
/// Returns `ConfigError::InvalidTimezoneOffset` outside ±14 hours.
pub const fn validate_timezone_offset(offset: i32) -> Result<(), ConfigError> {
    if offset >= -MAX_TIMEZONE_OFFSET && offset <= MAX_TIMEZONE_OFFSET {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimezoneOffset(offset))
    }
}
