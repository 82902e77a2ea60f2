//! Configuration loading and management.
//!
//! - [`types`]: the config structs and TOML loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: checks run before connecting

mod defaults;
mod types;
mod validation;

pub use types::{ClientConfig, ConfigError, ConnectionConfig, IdentityConfig, ServerConfig};
pub use validation::{validate, ValidationError};
