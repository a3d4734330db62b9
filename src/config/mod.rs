//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML, or TOML by extension)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NfConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    Configuration, LifecycleConfig, LoggerConfig, MetricsConfig, NfConfig, SbiConfig, SecurityConfig, TlsConfig,
};
pub use validation::ValidationError;
