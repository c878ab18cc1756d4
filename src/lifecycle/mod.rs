//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Base config → Bootstrap → configuration script → finish() → Ready
//!     Ready → HttpServer → bind listener → serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then script, then listeners
//! - The startup barrier is a type, not a timing assumption

pub mod shutdown;
pub mod startup;

pub use shutdown::{shutdown_signal, Shutdown};
pub use startup::{Bootstrap, Ready, StartupError};
