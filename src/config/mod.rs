//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/promptcopilot/config.toml)
//! 3. Project config (.promptcopilot/config.toml)
//! 4. Environment variables (PROMPTCOPILOT_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
