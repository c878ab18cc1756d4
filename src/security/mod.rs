//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → registry.rs (role the path requires)
//!     → access_control.rs (role the caller holds, via RoleResolver)
//!     → allowed: pass to the file service
//!     → denied: deny::DenyDispatcher
//! ```
//!
//! # Design Decisions
//! - Fail closed: unknown callers are anonymous
//! - Public paths skip role resolution entirely

pub mod access_control;
pub mod registry;

pub use access_control::{AnonymousResolver, RoleResolver};
pub use registry::{PermissionRegistry, Role};
