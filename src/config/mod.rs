//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! conf/conf.toml | conf/conf_prod.toml   (picked by mode)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → TransportConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new log-flag table swapped into the dispatcher
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only log flags are hot-reloadable; routes and secrets need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_for_mode, ConfigError, PROD_MODE};
pub use schema::{
    AuthConfig, ClientConfig, DispatchConfig, DispatchMode, ListenerConfig, LogFormat,
    LoggingConfig, TransportConfig,
};
