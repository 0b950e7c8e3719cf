//! # mw-protocol
//!
//! Core protocol definitions and data models for microwave-kit.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (TOML config, YAML item catalog)
//! - Runtime appliance state (door, process, item slot, affordances)
//! - Communication between front ends and the core session
//!
//! ## Modules
//!
//! - [`appliance_models`]: Door/process state, item slot, affordances, cycle reports
//! - [`config_models`]: Global configuration from config.toml
//! - [`item_models`]: Item catalog entries
//! - [`ipc`]: Operations and Events for front end/core communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for browser clients
//! - Independent compilation: No dependencies on other microwave-kit crates

pub mod appliance_models;
pub mod config_models;
pub mod ipc;
pub mod item_models;

// Re-export all public types for convenience
pub use appliance_models::*;
pub use config_models::*;
pub use ipc::*;
pub use item_models::*;
