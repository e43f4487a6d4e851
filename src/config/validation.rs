//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (truncate limit, flag bits)
//! - Check settings that depend on each other (shutdown route needs a token)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: TransportConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::TransportConfig;
use crate::http::LogFlag;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("dispatch.truncate_limit must be greater than zero")]
    TruncateLimit,

    #[error("logging.flags[{path}] = {value} uses bits outside 0..=3")]
    LogFlag { path: String, value: u8 },

    #[error("dispatch.shutdown_route requires a non-empty auth.control_token")]
    ShutdownWithoutToken,
}

/// Check a parsed configuration.
pub fn validate_config(config: &TransportConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.dispatch.truncate_limit == 0 {
        errors.push(ValidationError::TruncateLimit);
    }

    for (path, value) in &config.logging.flags {
        if *value & !LogFlag::ALL.bits() != 0 {
            errors.push(ValidationError::LogFlag {
                path: path.clone(),
                value: *value,
            });
        }
    }

    if config.dispatch.shutdown_route && config.auth.control_token.is_empty() {
        errors.push(ValidationError::ShutdownWithoutToken);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
