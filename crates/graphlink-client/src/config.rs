//! Configuration for the graph proxy client
//!
//! This module contains the configuration type and its environment loading.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use graphlink_interfaces::{GraphConnection, GraphError, GraphResult};

use crate::normalize::ScanMode;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the graph proxy
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// Graph database the proxy should connect to
    #[serde(default)]
    pub connection: GraphConnection,

    /// Timeout in seconds for each HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How malformed records in query results are handled
    #[serde(default)]
    pub scan_mode: ScanMode,
}

fn default_proxy_url() -> String {
    "http://127.0.0.1:8010".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Creates a configuration for `connection` behind the proxy at `proxy_url`
    pub fn new(proxy_url: impl Into<String>, connection: GraphConnection) -> Self {
        Self {
            proxy_url: proxy_url.into(),
            connection,
            ..Self::default()
        }
    }

    /// Sets the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the record scan mode
    pub fn with_scan_mode(mut self, scan_mode: ScanMode) -> Self {
        self.scan_mode = scan_mode;
        self
    }

    /// Load configuration from environment variables
    pub fn load() -> GraphResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup using the environment variable names
    pub fn from_lookup<F>(lookup: F) -> GraphResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(proxy_url) = lookup("GRAPHLINK_PROXY_URL") {
            config.proxy_url = proxy_url;
        }

        if let Some(host) = lookup("GRAPHLINK_DB_HOST") {
            config.connection.host = host;
        }

        if let Some(graphname) = lookup("GRAPHLINK_GRAPH") {
            config.connection.graphname = graphname;
        }

        if let Some(secret) = lookup("GRAPHLINK_SECRET") {
            config.connection.secret = secret;
        }

        if let Some(token) = lookup("GRAPHLINK_TOKEN") {
            config.connection.token = token;
        }

        if let Some(timeout) = lookup("GRAPHLINK_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.timeout_secs = secs;
            } else {
                warn!("Invalid GRAPHLINK_TIMEOUT_SECS value: {}", timeout);
            }
        }

        if let Some(mode) = lookup("GRAPHLINK_SCAN_MODE") {
            config.scan_mode = match mode.to_lowercase().as_str() {
                "skip" => ScanMode::SkipMalformed,
                "stop" => ScanMode::StopAtFirstMalformed,
                _ => {
                    warn!("Invalid GRAPHLINK_SCAN_MODE value: {}, using default skip", mode);
                    ScanMode::default()
                }
            };
        }

        // Validate required fields
        if config.proxy_url.is_empty() {
            return Err(GraphError::Config("Proxy URL is required".to_string()));
        }

        if config.connection.host.is_empty() {
            return Err(GraphError::Config("Graph database host is required".to_string()));
        }

        if config.connection.graphname.is_empty() {
            return Err(GraphError::Config("Graph name is required".to_string()));
        }

        if config.connection.secret.is_empty() {
            warn!("No GRAPHLINK_SECRET provided - the proxy may reject the connection");
        }

        info!("Loaded client configuration");
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            connection: GraphConnection::default(),
            timeout_secs: default_timeout_secs(),
            scan_mode: ScanMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.proxy_url, "http://127.0.0.1:8010");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.scan_mode, ScanMode::SkipMalformed);
        assert!(config.connection.token.is_empty());
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("GRAPHLINK_PROXY_URL", "http://proxy:9000"),
            ("GRAPHLINK_DB_HOST", "https://tg.example.com"),
            ("GRAPHLINK_GRAPH", "social"),
            ("GRAPHLINK_SECRET", "s3cr3t"),
            ("GRAPHLINK_TIMEOUT_SECS", "5"),
            ("GRAPHLINK_SCAN_MODE", "STOP"),
        ]))
        .unwrap();

        assert_eq!(config.proxy_url, "http://proxy:9000");
        assert_eq!(config.connection.host, "https://tg.example.com");
        assert_eq!(config.connection.graphname, "social");
        assert_eq!(config.connection.secret, "s3cr3t");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.scan_mode, ScanMode::StopAtFirstMalformed);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("GRAPHLINK_DB_HOST", "localhost"),
            ("GRAPHLINK_GRAPH", "social"),
            ("GRAPHLINK_TIMEOUT_SECS", "soon"),
            ("GRAPHLINK_SCAN_MODE", "sometimes"),
        ]))
        .unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.scan_mode, ScanMode::SkipMalformed);
    }

    #[test]
    fn test_missing_graph_is_an_error() {
        let result = ClientConfig::from_lookup(lookup_from(&[("GRAPHLINK_DB_HOST", "localhost")]));
        assert!(matches!(result, Err(GraphError::Config(_))));

        let result = ClientConfig::from_lookup(lookup_from(&[("GRAPHLINK_GRAPH", "social")]));
        assert!(matches!(result, Err(GraphError::Config(_))));
    }
}
