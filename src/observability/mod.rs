//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, access events)
//!     → metrics.rs (deny counters, handler gauge)
//!
//! Consumers:
//!     → console, access log file, error log file
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Log destinations come from the startup script (AccessLog / ErrorLog)
//! - Request ID flows through the access events
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
