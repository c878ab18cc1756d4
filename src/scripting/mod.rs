//! Embedded scripting subsystem (Rhai).
//!
//! # Data Flow
//! ```text
//! Startup:
//!     script source → compile (AST, shared)
//!     → pool.rs unbound context (bridge functions only)
//!     → run once, mutating config / registry / deny slot
//!
//! Denied request with a custom handler:
//!     → exchange.rs (request snapshot + response sink)
//!     → pool.rs checkout (fresh engine, bridge + request-bound functions)
//!     → handler runs, context dropped
//! ```
//!
//! # Design Decisions
//! - Engines are never shared between units of work
//! - Scripts reach host state only through bridge.rs
//! - Operation budget per context guards against runaway scripts

pub mod bridge;
pub mod error;
pub mod exchange;
pub mod pool;

pub use bridge::Bridge;
pub use error::{ScriptError, ScriptResult};
pub use exchange::{Exchange, RequestInfo, ResponseSink};
pub use pool::{ContextPool, ExecutionContext};
