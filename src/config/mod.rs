//! Advisor Configuration Module
//!
//! Provides deployment configuration loaded from TOML files.
//!
//! ## Loading Order
//!
//! 1. `CROP_ADVISOR_CONFIG` environment variable (path to TOML file)
//! 2. `crop_advisor.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded value is passed explicitly to the engine builder; there is no
//! process-global config.

mod advisor_config;
pub mod defaults;

pub use advisor_config::*;
