//! Configuration types
//!
//! Board-agnostic instrument configuration, built in code, parsed from a
//! small TOML subset, or loaded from that text in storage.

pub mod loader;
pub mod toml;
pub mod types;

pub use self::toml::parse_config;
pub use loader::{load_config, store_config, LoadError};
pub use types::*;
