//! Execution context pool.
//!
//! # Responsibilities
//! - Build a fresh, isolated engine for every unit of work
//! - Pre-register the bridge functions (and request-bound functions)
//! - Bound the number of live contexts with a semaphore
//!
//! # Design Decisions
//! - Contexts are created on checkout and dropped after one use, never reused
//! - Checkout waits at most `checkout_timeout` for a permit
//! - The permit lives inside the context, so dropping it frees the slot

use rhai::{Engine, AST};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ScriptingConfig;
use crate::scripting::bridge::Bridge;
use crate::scripting::error::{ScriptError, ScriptResult};
use crate::scripting::exchange::Exchange;

/// An engine instance owned by exactly one unit of work.
pub struct ExecutionContext {
    engine: Engine,
    exchange: Option<Exchange>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl ExecutionContext {
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The exchange this context is bound to, if any.
    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    /// Run a compiled script to completion.
    pub fn run(&self, ast: &AST) -> ScriptResult<()> {
        self.engine.run_ast(ast)?;
        Ok(())
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("exchange", &self.exchange)
            .field("pooled", &self._permit.is_some())
            .finish()
    }
}

/// Hands out isolated execution contexts.
pub struct ContextPool {
    bridge: Bridge,
    permits: Arc<Semaphore>,
    checkout_timeout: Duration,
    max_operations: u64,
}

impl ContextPool {
    pub fn new(bridge: Bridge, config: &ScriptingConfig) -> Self {
        Self {
            bridge,
            permits: Arc::new(Semaphore::new(config.max_contexts)),
            checkout_timeout: Duration::from_millis(config.checkout_timeout_ms),
            max_operations: config.max_operations,
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    fn new_engine(&self) -> Engine {
        let mut engine = Engine::new();
        if self.max_operations > 0 {
            engine.set_max_operations(self.max_operations);
        }
        self.bridge.register(&mut engine);
        engine
    }

    /// Context for the startup run. Not counted against the pool; `print`
    /// goes to the log.
    pub fn unbound(&self) -> ExecutionContext {
        let mut engine = self.new_engine();
        engine.on_print(|text| tracing::info!(target: "confbridge::script", "{}", text));
        engine.on_debug(|text, _, pos| {
            tracing::debug!(target: "confbridge::script", position = %pos, "{}", text)
        });
        ExecutionContext {
            engine,
            exchange: None,
            _permit: None,
        }
    }

    /// Check out a context bound to `exchange`.
    pub async fn checkout(&self, exchange: Exchange) -> ScriptResult<ExecutionContext> {
        let permit = match tokio::time::timeout(
            self.checkout_timeout,
            self.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(ScriptError::PoolClosed),
            Err(_) => return Err(ScriptError::CheckoutTimeout(self.checkout_timeout)),
        };

        let mut engine = self.new_engine();
        exchange.register(&mut engine);

        Ok(ExecutionContext {
            engine,
            exchange: Some(exchange),
            _permit: Some(permit),
        })
    }

    /// Contexts that can be checked out right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Refuse all further checkouts.
    pub fn close(&self) {
        self.permits.close();
    }
}
