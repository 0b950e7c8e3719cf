//! Configuration loading and management.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.microwave/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

/// Name of the project directory holding all configuration.
pub const PROJECT_DIR: &str = ".microwave";
