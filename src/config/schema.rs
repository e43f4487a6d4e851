//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section has defaults so a minimal file (or none) is valid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the transport layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TransportConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Dispatcher behaviour.
    pub dispatch: DispatchConfig,

    /// Authentication secrets.
    pub auth: AuthConfig,

    /// Log sink and per-path log flags.
    pub logging: LoggingConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Whether the dispatcher writes request/response bodies to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Log bodies for paths whose log flag asks for it.
    #[default]
    Verbose,
    /// Never log bodies.
    Silent,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub mode: DispatchMode,

    /// Bodies longer than this many bytes are truncated in the log unless the
    /// path has the full-log bit.
    pub truncate_limit: usize,

    /// Register `GET /internal/shutdown`. Requires a control token.
    pub shutdown_route: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Verbose,
            truncate_limit: 255,
            shutdown_route: false,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Token expected in base request envelopes and on the shutdown route.
    pub control_token: String,

    /// Secret mixed into request signatures.
    pub shared_secret: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub level: String,

    pub format: LogFormat,

    /// Per-path log flags: bit 0 logs the body, bit 1 logs it in full.
    pub flags: HashMap<String, u8>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            flags: HashMap::new(),
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 5,
            user_agent: concat!("rpc-transport/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.dispatch.truncate_limit, 255);
        assert_eq!(config.dispatch.mode, DispatchMode::Verbose);
        assert!(!config.dispatch.shutdown_route);
        assert!(config.auth.control_token.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config: TransportConfig = toml::from_str(
            r#"
            [dispatch]
            mode = "silent"

            [logging.flags]
            "/orders" = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch.mode, DispatchMode::Silent);
        assert_eq!(config.dispatch.truncate_limit, 255);
        assert_eq!(config.logging.flags.get("/orders"), Some(&3));
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
