//! Initialization module for creating .microwave directory structures.
//!
//! This module scaffolds a new project by generating a `.microwave/`
//! directory from embedded templates:
//! - Global configuration (`config.toml`)
//! - Item catalog (`items/*.yaml`)
//!
//! # Example
//!
//! ```no_run
//! use mw_core::init::{InitOptions, generate_project_structure};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_project_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_project_structure, InitOptions};
pub use templates::{get_template, list_templates};
