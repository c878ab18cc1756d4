//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! base file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → command line overrides
//!     → startup script (scripting::bridge mutates RuntimeConfig)
//!     → validation.rs (again)
//!     → frozen Arc<RuntimeConfig> shared with the server
//! ```
//!
//! # Design Decisions
//! - Only the startup phase writes; the server reads a frozen snapshot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ObservabilityConfig;
pub use schema::RuntimeConfig;
pub use schema::ScriptingConfig;
pub use schema::ServerConfig;
pub use schema::TimeoutConfig;
