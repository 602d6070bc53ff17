//! Server configuration file.
//!
//! ```toml
//! bind = "127.0.0.1:8000"
//! gateway_url = "http://127.0.0.1:9000/"
//!
//! [client]
//! proxy = "socks5://127.0.0.1:1080"
//! locale = "en_US"
//! timezone_offset = -14400
//! request_timeout_ms = 5000
//!
//! [log]
//! format = "json"
//! level = "info"
//! ```

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use igrest_core::{ClientConfig, ConfigError};
use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "igrest.toml";

/// Error loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid client configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,
    /// Base URL of the automation gateway.
    pub gateway_url: String,
    /// Baseline settings for every new client.
    pub client: ClientConfig,
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            gateway_url: "http://127.0.0.1:9000/".to_string(),
            client: ClientConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `igrest.toml` in the
    /// working directory is used if present, otherwise defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or the client
    /// section is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, LoadError> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load_from_path(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.client.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this schema.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ServerConfig::parse("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = ServerConfig::parse(
            r#"
            bind = "0.0.0.0:8080"

            [client]
            locale = "en_US"

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.gateway_url, ServerConfig::default().gateway_url);
        assert_eq!(config.client.locale.as_deref(), Some("en_US"));
        assert_eq!(
            config.client.request_timeout(),
            igrest_core::DEFAULT_REQUEST_TIMEOUT
        );
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(ServerConfig::parse("[log]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ServerConfig::load(Some(Path::new("/nonexistent/igrest.toml"))).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_invalid_client_section() {
        let path = std::env::temp_dir().join(format!("igrest-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[client]\ntimezone_offset = 999999\n").unwrap();

        let result = ServerConfig::load(Some(&path));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(LoadError::Invalid(ConfigError::InvalidTimezoneOffset(999_999)))
        ));
    }
}
