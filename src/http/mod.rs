//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup)
//!     → request.rs (request ID, access event)
//!     → security::access_control (permission gate)
//!         denied  → deny::DenyDispatcher
//!         allowed → static files from the server directory
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
