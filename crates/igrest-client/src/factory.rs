//! Factory for gateway-backed clients.

use igrest_core::{ClientConfig, ClientFactory, ConfigError};
use url::Url;

use crate::client::GatewayClient;

/// Builds unauthenticated [`GatewayClient`]s with baseline configuration.
#[derive(Debug, Clone)]
pub struct GatewayFactory {
    base_url: Url,
    config: ClientConfig,
}

impl GatewayFactory {
    /// Create a factory for the gateway at `gateway_url`.
    ///
    /// # Errors
    /// Returns error if `gateway_url` is not an absolute http(s) URL or the
    /// client configuration is invalid.
    pub fn new(gateway_url: &str, config: ClientConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(gateway_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::Build(format!("invalid gateway URL '{gateway_url}'")))?;
        config.validate()?;

        Ok(Self { base_url, config })
    }

    /// Baseline configuration applied to every client.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ClientFactory for GatewayFactory {
    type Client = GatewayClient;

    fn create(&self) -> Result<GatewayClient, ConfigError> {
        let mut client = GatewayClient::new(self.base_url.clone())?;
        self.config.apply(&mut client)?;
        Ok(client)
    }
}
