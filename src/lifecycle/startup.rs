//! Startup orchestration.
//!
//! # Responsibilities
//! - Own the mutable configuration, registry and deny slot during startup
//! - Compile and run the configuration script once
//! - Validate the result and freeze it into a `Ready` value
//!
//! # Design Decisions
//! - `Ready` can only be obtained from `Bootstrap::finish`, and the server
//!   can only be built from `Ready`: no request is served before the script
//!   has finished
//! - Fail fast: any script or validation error is fatal
//! - The script is optional; without one the defaults apply

use rhai::Engine;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::config::loader::{load_script, ConfigError};
use crate::config::validation::{join_errors, validate_config, ValidationError};
use crate::config::{RuntimeConfig, ServerConfig};
use crate::deny::{DenyDispatcher, DenySlot};
use crate::scripting::{Bridge, ContextPool, ScriptError};
use crate::security::PermissionRegistry;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("configuration script failed: {0}")]
    Script(#[from] ScriptError),

    #[error("invalid configuration after script: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Startup phase: the only place configuration is written.
pub struct Bootstrap {
    settings: ServerConfig,
    runtime: Arc<RwLock<RuntimeConfig>>,
    registry: Arc<PermissionRegistry>,
    slot: Arc<DenySlot>,
    bridge: Bridge,
}

impl Bootstrap {
    pub fn new(settings: ServerConfig) -> Self {
        Self::with_registry(settings, PermissionRegistry::new())
    }

    /// Start from a custom registry instead of the stock prefixes.
    pub fn with_registry(settings: ServerConfig, registry: PermissionRegistry) -> Self {
        let runtime = Arc::new(RwLock::new(settings.runtime.clone()));
        let registry = Arc::new(registry);
        let slot = Arc::new(DenySlot::new());
        let bridge = Bridge::new(runtime.clone(), registry.clone(), slot.clone());
        Self {
            settings,
            runtime,
            registry,
            slot,
            bridge,
        }
    }

    /// Compile and run a configuration script.
    pub fn run_script(&mut self, source: &str) -> Result<(), StartupError> {
        let ast = Arc::new(Engine::new().compile(source).map_err(ScriptError::from)?);
        self.bridge = self.bridge.clone().with_script(ast.clone());

        let pool = ContextPool::new(self.bridge.clone(), &self.settings.scripting);
        pool.unbound().run(&ast)?;
        Ok(())
    }

    /// Load `path`, record it as the script path and run it.
    pub fn run_script_file(&mut self, path: &Path) -> Result<(), StartupError> {
        let source = load_script(path)?;
        self.runtime
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .script_path = path.display().to_string();

        tracing::info!(path = %path.display(), "Running configuration script");
        self.run_script(&source)
    }

    /// End the startup phase.
    pub fn finish(self) -> Result<Ready, StartupError> {
        let mut settings = self.settings;
        settings.runtime = self.bridge.runtime();
        validate_config(&settings).map_err(StartupError::Validation)?;

        let pool = Arc::new(ContextPool::new(self.bridge, &settings.scripting));
        let dispatcher = DenyDispatcher::new(self.slot, pool);

        Ok(Ready {
            runtime: Arc::new(settings.runtime.clone()),
            settings,
            registry: self.registry,
            dispatcher,
        })
    }
}

/// Everything the server needs, produced by a completed startup.
#[derive(Clone)]
pub struct Ready {
    pub settings: ServerConfig,
    pub runtime: Arc<RuntimeConfig>,
    pub registry: Arc<PermissionRegistry>,
    pub dispatcher: DenyDispatcher,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Role;
    use std::io::Write;

    #[test]
    fn test_script_configures_server() {
        let mut bootstrap = Bootstrap::new(ServerConfig::default());
        bootstrap
            .run_script(
                r#"
                SetAddr("127.0.0.1:7000");
                ClearPermissions();
                AddAdminPrefix("/ops");
                AddUserPrefix("/members");
                DenyHandler(|| print("nope"));
                "#,
            )
            .unwrap();

        let ready = bootstrap.finish().unwrap();
        assert_eq!(ready.runtime.bind_address, "127.0.0.1:7000");
        assert_eq!(ready.registry.role("/ops/x"), Role::Admin);
        assert_eq!(ready.registry.role("/members"), Role::User);
        assert_eq!(ready.registry.role("/admin"), Role::Public);
        assert!(ready.dispatcher.slot().is_custom());
    }

    #[test]
    fn test_compile_error_is_reported() {
        let mut bootstrap = Bootstrap::new(ServerConfig::default());
        let err = bootstrap.run_script("SetAddr(").unwrap_err();
        assert!(matches!(err, StartupError::Script(ScriptError::Compile(_))));
    }

    #[test]
    fn test_misuse_aborts_run() {
        let mut bootstrap = Bootstrap::new(ServerConfig::default());
        let err = bootstrap.run_script("SetAddr(42);").unwrap_err();
        assert!(matches!(err, StartupError::Script(ScriptError::Runtime(_))));
    }

    #[test]
    fn test_invalid_address_fails_finish() {
        let mut bootstrap = Bootstrap::new(ServerConfig::default());
        bootstrap.run_script(r#"SetAddr("nowhere");"#).unwrap();
        let err = bootstrap.finish().err().unwrap();
        assert!(matches!(err, StartupError::Validation(_)));
    }

    #[test]
    fn test_script_file_sets_script_path() {
        let mut file = tempfile::Builder::new().suffix(".rhai").tempfile().unwrap();
        writeln!(file, "SetDebug(true);").unwrap();

        let mut bootstrap = Bootstrap::new(ServerConfig::default());
        bootstrap.run_script_file(file.path()).unwrap();
        let ready = bootstrap.finish().unwrap();

        assert!(ready.runtime.debug);
        assert_eq!(ready.runtime.script_path, file.path().display().to_string());
        assert!(ready
            .runtime
            .server_info()
            .ends_with(&format!("Server configuration:\t{}\n", file.path().display())));
    }
}
