//! Deny dispatch: answers every denied request exactly once.
//!
//! # Responsibilities
//! - Pick the active handler from the slot
//! - Run a custom handler in its own execution context on a blocking worker
//! - Fall back to the default response, tripping the slot on handler failure
//!
//! # Design Decisions
//! - The state is snapshotted once per request; a request that started with
//!   the custom handler may finish with it while another request trips it
//! - Checkout timeouts answer with the default response without tripping
//! - A handler panic counts as a handler failure

use axum::response::Response;
use std::sync::Arc;

use crate::deny::handler::permission_denied;
use crate::deny::slot::{DenySlot, DenyState};
use crate::observability::metrics;
use crate::scripting::error::ScriptError;
use crate::scripting::exchange::{Exchange, RequestInfo};
use crate::scripting::pool::ContextPool;

/// Routes denied requests to the active deny handler.
#[derive(Clone)]
pub struct DenyDispatcher {
    slot: Arc<DenySlot>,
    pool: Arc<ContextPool>,
}

impl DenyDispatcher {
    pub fn new(slot: Arc<DenySlot>, pool: Arc<ContextPool>) -> Self {
        Self { slot, pool }
    }

    pub fn slot(&self) -> &Arc<DenySlot> {
        &self.slot
    }

    /// Produce the response for a denied request.
    pub async fn dispatch(&self, request: RequestInfo) -> Response {
        let state = self.slot.current();
        let handler = match &*state {
            DenyState::Default => {
                metrics::record_denied("default");
                return permission_denied();
            }
            DenyState::Custom(handler) => handler.clone(),
        };

        let path = request.path().to_string();
        let exchange = Exchange::new(request);
        let ctx = match self.pool.checkout(exchange.clone()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "No execution context for deny handler");
                metrics::record_denied("default");
                return permission_denied();
            }
        };

        let result = tokio::task::spawn_blocking(move || handler.invoke(&ctx))
            .await
            .unwrap_or_else(|e| Err(ScriptError::Worker(e.to_string())));

        match result {
            Ok(()) => {
                metrics::record_denied("custom");
                exchange.sink().take_response()
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Permission denied handler failed");
                metrics::record_handler_failure();
                self.slot.trip(&state);
                metrics::record_denied("default");
                permission_denied()
            }
        }
    }
}
