//! # Configuration Modules
//!
//! This module handles locating and parsing runtime configuration files:
//! an environment-variable override first, then a default file next to the
//! executable, with built-in defaults when neither exists.

/// Provides runtime configuration file resolution and JSON parsing.
pub mod config_collector;
