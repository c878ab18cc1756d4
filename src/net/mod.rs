//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! RuntimeConfig (bind address, cert, key)
//!     → plain TCP listener (tokio)            when no TLS material is set
//!     → tls.rs → axum-server rustls listener  when cert and key are set
//!     → Hand off to HTTP layer
//! ```

pub mod tls;
