//! Script-driven access control and runtime settings for an HTTP server.

pub mod config;
pub mod deny;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod scripting;
pub mod security;

pub use config::schema::{RuntimeConfig, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::{Bootstrap, Ready, Shutdown};
