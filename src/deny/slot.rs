//! The process-wide deny handler slot.
//!
//! # States
//! - Default: the built-in denial response is used
//! - Custom: a handler installed by `DenyHandler` answers denied requests
//!
//! # State Transitions
//! ```text
//! Default → Custom: install()
//! Custom → Custom:  install() (replaces the handler)
//! Custom → Default: trip() after the installed handler fails
//! ```
//!
//! # Design Decisions
//! - One `ArcSwap` holds the state; readers take a snapshot without locking
//! - `trip` is a compare-and-swap against the snapshot that failed, so only
//!   the first failure of a given handler performs (and logs) the transition
//! - Nothing re-arms a tripped slot except another `install`

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

use crate::deny::handler::DenyCallable;
use crate::observability::metrics;

/// Current deny handler state.
#[derive(Clone)]
pub enum DenyState {
    Default,
    Custom(Arc<dyn DenyCallable>),
}

impl fmt::Debug for DenyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyState::Default => write!(f, "Default"),
            DenyState::Custom(handler) => write!(f, "Custom({})", handler.name()),
        }
    }
}

/// Holder for the active deny handler.
pub struct DenySlot {
    state: ArcSwap<DenyState>,
}

impl DenySlot {
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(DenyState::Default),
        }
    }

    /// Install `handler` as the custom deny handler.
    pub fn install(&self, handler: Arc<dyn DenyCallable>) {
        tracing::info!(handler = %handler.name(), "Custom deny handler installed");
        self.state.store(Arc::new(DenyState::Custom(handler)));
        metrics::record_custom_handler_active(true);
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> Arc<DenyState> {
        self.state.load_full()
    }

    pub fn is_custom(&self) -> bool {
        matches!(**self.state.load(), DenyState::Custom(_))
    }

    /// Revert to the default handler if `failed` is still the active state.
    ///
    /// Returns true when this call performed the transition.
    pub fn trip(&self, failed: &Arc<DenyState>) -> bool {
        if matches!(**failed, DenyState::Default) {
            return false;
        }

        let previous = self
            .state
            .compare_and_swap(failed, Arc::new(DenyState::Default));
        let tripped = Arc::ptr_eq(&*previous, failed);
        if tripped {
            tracing::warn!(
                previous = ?**failed,
                "Deny handler disabled, using the default handler from now on"
            );
            metrics::record_custom_handler_active(false);
        }
        tripped
    }
}

impl Default for DenySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DenySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenySlot")
            .field("state", &**self.state.load())
            .finish()
    }
}
