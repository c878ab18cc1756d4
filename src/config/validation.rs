//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool size > 0, addresses parse)
//! - Check that TLS material is given as a pair
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs on the TOML base file and again after the startup script

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("TLS needs both a certificate and a key")]
    IncompleteTls,

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Render a list of errors on one line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let runtime = &config.runtime;

    if runtime.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(runtime.bind_address.clone()));
    }

    if runtime.tls_cert_path.is_empty() != runtime.tls_key_path.is_empty() {
        errors.push(ValidationError::IncompleteTls);
    }

    let metrics_address = &config.observability.metrics_address;
    if !metrics_address.is_empty() && metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(metrics_address.clone()));
    }

    if config.scripting.max_contexts == 0 {
        errors.push(ValidationError::Zero("scripting.max_contexts"));
    }
    if config.scripting.checkout_timeout_ms == 0 {
        errors.push(ValidationError::Zero("scripting.checkout_timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
