//! Layered server configuration: `.env`, TOML file, environment, CLI.

pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AdvisorConfig, AuditConfig, Config, ConfigMetadata, ConfigWarning, ConfigWarnings,
    DatabaseConfig, ServerConfig, SyncConfig,
};
