//! Charge server configuration.

use serde::{Deserialize, Serialize};

/// Where the server keeps the account balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerConfig {
    /// In-process balance, lost on restart.
    Memory,
    /// Redis server URL.
    Redis(String),
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig::Memory
    }
}

/// Configuration for the charge server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Balance storage.
    pub ledger: LedgerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 1024 * 1024, // 1MB
            ledger: LedgerConfig::Memory,
        }
    }
}

impl ServerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the ledger taken from `ENDPOINT` and `PORT`.
    ///
    /// When `ENDPOINT` is set the balance lives in redis at
    /// `redis://$ENDPOINT:$PORT` (`PORT` defaults to 6379).
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ledger = match lookup("ENDPOINT").filter(|host| !host.is_empty()) {
            Some(host) => {
                let port = lookup("PORT").unwrap_or_else(|| "6379".to_string());
                LedgerConfig::Redis(format!("redis://{}:{}", host, port))
            }
            None => LedgerConfig::Memory,
        };
        Self::default().ledger(ledger)
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum request body size.
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Set the ledger backend.
    pub fn ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.ledger, LedgerConfig::Memory);
    }

    #[test]
    fn test_from_vars_without_endpoint_uses_memory() {
        let config = ServerConfig::from_vars(vars(&[("PORT", "7000")]));
        assert_eq!(config.ledger, LedgerConfig::Memory);
    }

    #[test]
    fn test_from_vars_redis_default_port() {
        let config = ServerConfig::from_vars(vars(&[("ENDPOINT", "cache.local")]));
        assert_eq!(
            config.ledger,
            LedgerConfig::Redis("redis://cache.local:6379".to_string())
        );
    }

    #[test]
    fn test_from_vars_redis_custom_port() {
        let config = ServerConfig::from_vars(vars(&[("ENDPOINT", "10.0.0.5"), ("PORT", "7000")]));
        assert_eq!(
            config.ledger,
            LedgerConfig::Redis("redis://10.0.0.5:7000".to_string())
        );
    }
}
