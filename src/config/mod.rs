/// Database connection and schema management
pub mod database;

/// Environment profiles, TOML loading and environment overrides
pub mod settings;

pub use settings::{AppConfig, Environment, load_app_configuration};
