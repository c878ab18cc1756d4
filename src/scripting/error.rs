//! Script execution error definitions.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while compiling or running configuration scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script source failed to parse.
    #[error("compile error: {0}")]
    Compile(#[from] rhai::ParseError),

    /// Script raised an error or misused a host function.
    #[error("script error: {0}")]
    Runtime(#[from] Box<rhai::EvalAltResult>),

    /// No execution context became free in time.
    #[error("no execution context available after {0:?}")]
    CheckoutTimeout(Duration),

    /// The context pool was shut down.
    #[error("execution context pool closed")]
    PoolClosed,

    /// The blocking worker running the script panicked or was cancelled.
    #[error("script worker failed: {0}")]
    Worker(String),

    /// A host-implemented handler reported failure.
    #[error("handler failed: {0}")]
    Handler(String),
}

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;
