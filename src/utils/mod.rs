//! Configuration management

pub mod config;

pub use config::{CatalogSnapshot, ConfigError, ConfigurationManager, EngineConfig};
