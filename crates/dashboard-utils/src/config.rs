//! Deployment configuration for the dashboard server

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5005;

/// Errors raised while resolving deployment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value could not be parsed
    #[error("Invalid port '{0}'")]
    InvalidPort(String),
}

/// Where the HTTP server binds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (e.g. "127.0.0.1", "0.0.0.0")
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Load from `DASHBOARD_HOST` / `DASHBOARD_PORT`, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("DASHBOARD_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }

        if let Some(port) = lookup("DASHBOARD_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        Ok(config)
    }

    /// Override the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 5005);
        assert_eq!(config.bind_address(), "127.0.0.1:5005");
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("DASHBOARD_HOST", "0.0.0.0"),
            ("DASHBOARD_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[("DASHBOARD_PORT", "http")]));
        assert!(matches!(err, Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::default().with_host("localhost").with_port(9000);
        assert_eq!(config.bind_address(), "localhost:9000");
    }
}
