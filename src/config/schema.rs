//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits so a base configuration can be read from a
//! TOML file before the startup script refines it.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Settings the configuration script may change.
    pub runtime: RuntimeConfig,

    /// Script engine limits and context pool sizing.
    pub scripting: ScriptingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Scalar server settings exposed to the configuration script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Directory served to clients.
    pub server_dir: String,

    /// Path to certificate file (PEM). Empty disables TLS.
    pub tls_cert_path: String,

    /// Path to private key file (PEM).
    pub tls_key_path: String,

    /// Address of the backing data store.
    pub store_address: String,

    /// Database index within the data store.
    pub store_index: i64,

    /// Verbose logging.
    pub debug: bool,

    /// Access log file. Empty logs to the console.
    pub access_log_path: String,

    /// Error log file. Empty logs to the console.
    pub error_log_path: String,

    /// Path of the configuration script that ran at startup.
    pub script_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            server_dir: ".".to_string(),
            tls_cert_path: String::new(),
            tls_key_path: String::new(),
            store_address: "localhost:6379".to_string(),
            store_index: 0,
            debug: false,
            access_log_path: String::new(),
            error_log_path: String::new(),
            script_path: "serverconf.rhai".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Human readable dump returned by the `ServerInfo` script function.
    ///
    /// Labels, tab padding and field order are relied upon by scripts that
    /// parse the output.
    pub fn server_info(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Server directory:\t{}\n", self.server_dir));
        s.push_str(&format!("Server address:\t\t{}\n", self.bind_address));
        s.push_str(&format!("TLS certificate:\t{}\n", self.tls_cert_path));
        s.push_str(&format!("TLS key:\t\t{}\n", self.tls_key_path));
        s.push_str(&format!("Redis address:\t\t{}\n", self.store_address));
        s.push_str(&format!("Redis database index:\t{}\n", self.store_index));
        s.push_str(&format!("Server configuration:\t{}\n", self.script_path));
        s
    }

    /// Parse the bind address. A bare ":port" binds all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        match self.bind_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port).parse(),
            None => self.bind_address.parse(),
        }
    }

    /// True when both certificate and key paths are set.
    pub fn tls_enabled(&self) -> bool {
        !self.tls_cert_path.is_empty() && !self.tls_key_path.is_empty()
    }
}

/// Script engine and execution context settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Maximum execution contexts alive at once.
    pub max_contexts: usize,

    /// How long a denied request waits for a context, in milliseconds.
    pub checkout_timeout_ms: u64,

    /// Operation budget per script invocation (0 = unlimited).
    pub max_operations: u64,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            max_contexts: 64,
            checkout_timeout_ms: 2000,
            max_operations: 1_000_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus endpoint bind address. Empty disables the exporter.
    pub metrics_address: String,
}
