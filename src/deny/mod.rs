//! Deny handling subsystem.
//!
//! # Data Flow
//! ```text
//! Request denied by security::access_control
//!     → dispatch.rs (snapshot slot state)
//!         Default → handler.rs permission_denied()
//!         Custom  → scripting::pool checkout (bound to this exchange)
//!                 → handler invoked on a blocking worker
//!                 → Ok: buffered script response
//!                 → Err: slot.rs trip() → permission_denied()
//! ```
//!
//! # Design Decisions
//! - One-shot breaker: a failing custom handler is never re-armed automatically
//! - Every denied request gets a response, whatever the handler does

pub mod dispatch;
pub mod handler;
pub mod slot;

pub use dispatch::DenyDispatcher;
pub use handler::{permission_denied, DenyCallable, ScriptDenyHandler};
pub use slot::{DenySlot, DenyState};
