//! Host functions exposed to configuration scripts.
//!
//! # Script Surface
//! ```text
//! SetAddr(addr)            bind address
//! ClearPermissions()       every path becomes public
//! AddUserPrefix(path)      path prefix needing user rights
//! AddAdminPrefix(path)     path prefix needing admin rights
//! DenyHandler(fn)          custom "permission denied" handler
//! SetDebug(flag)           verbose logging
//! AccessLog(path) -> bool  access log file
//! ErrorLog(path) -> bool   error log file
//! ServerInfo() -> string   settings dump
//! ```
//!
//! # Design Decisions
//! - Names and scalar argument shapes are fixed; existing scripts rely on them
//! - Every script function is a thin wrapper over a typed method on `Bridge`
//! - Wrong argument types fail inside the engine and abort the script run
//! - The log setters do not check writability and always report success

use rhai::{Engine, FnPtr, AST};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::RuntimeConfig;
use crate::deny::handler::{DenyCallable, ScriptDenyHandler};
use crate::deny::slot::DenySlot;
use crate::security::registry::PermissionRegistry;

/// Capabilities a script is allowed to use.
#[derive(Clone)]
pub struct Bridge {
    config: Arc<RwLock<RuntimeConfig>>,
    registry: Arc<PermissionRegistry>,
    slot: Arc<DenySlot>,
    script: Arc<AST>,
}

impl Bridge {
    pub fn new(
        config: Arc<RwLock<RuntimeConfig>>,
        registry: Arc<PermissionRegistry>,
        slot: Arc<DenySlot>,
    ) -> Self {
        Self {
            config,
            registry,
            slot,
            script: Arc::new(AST::empty()),
        }
    }

    /// Attach the compiled script that function pointers handed to
    /// `DenyHandler` are resolved against.
    pub fn with_script(mut self, script: Arc<AST>) -> Self {
        self.script = script;
        self
    }

    pub fn registry(&self) -> &Arc<PermissionRegistry> {
        &self.registry
    }

    pub fn slot(&self) -> &Arc<DenySlot> {
        &self.slot
    }

    fn config_read(&self) -> RwLockReadGuard<'_, RuntimeConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn config_write(&self) -> RwLockWriteGuard<'_, RuntimeConfig> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current runtime settings.
    pub fn runtime(&self) -> RuntimeConfig {
        self.config_read().clone()
    }

    pub fn set_addr(&self, addr: &str) {
        tracing::debug!(address = %addr, "Script set bind address");
        self.config_write().bind_address = addr.to_string();
    }

    pub fn clear_permissions(&self) {
        tracing::debug!("Script cleared permissions");
        self.registry.clear();
    }

    pub fn add_user_prefix(&self, prefix: &str) {
        tracing::debug!(prefix = %prefix, "Script added user prefix");
        self.registry.add_user_prefix(prefix);
    }

    pub fn add_admin_prefix(&self, prefix: &str) {
        tracing::debug!(prefix = %prefix, "Script added admin prefix");
        self.registry.add_admin_prefix(prefix);
    }

    pub fn deny_handler(&self, handler: Arc<dyn DenyCallable>) {
        self.slot.install(handler);
    }

    pub fn set_debug(&self, debug: bool) {
        self.config_write().debug = debug;
    }

    // TODO: return false when the file cannot be opened for appending.
    pub fn access_log(&self, path: &str) -> bool {
        self.config_write().access_log_path = path.to_string();
        true
    }

    pub fn error_log(&self, path: &str) -> bool {
        self.config_write().error_log_path = path.to_string();
        true
    }

    pub fn server_info(&self) -> String {
        self.config_read().server_info()
    }

    /// Register the script surface into `engine`'s global namespace.
    pub fn register(&self, engine: &mut Engine) {
        let bridge = self.clone();
        engine.register_fn("SetAddr", move |addr: &str| bridge.set_addr(addr));

        let bridge = self.clone();
        engine.register_fn("ClearPermissions", move || bridge.clear_permissions());

        let bridge = self.clone();
        engine.register_fn("AddUserPrefix", move |prefix: &str| bridge.add_user_prefix(prefix));

        let bridge = self.clone();
        engine.register_fn("AddAdminPrefix", move |prefix: &str| bridge.add_admin_prefix(prefix));

        let bridge = self.clone();
        engine.register_fn("DenyHandler", move |handler: FnPtr| {
            let handler = ScriptDenyHandler::new(handler, bridge.script.clone());
            bridge.deny_handler(Arc::new(handler));
        });

        let bridge = self.clone();
        engine.register_fn("SetDebug", move |debug: bool| bridge.set_debug(debug));

        let bridge = self.clone();
        engine.register_fn("AccessLog", move |path: &str| bridge.access_log(path));

        let bridge = self.clone();
        engine.register_fn("ErrorLog", move |path: &str| bridge.error_log(path));

        let bridge = self.clone();
        engine.register_fn("ServerInfo", move || bridge.server_info());
    }
}
