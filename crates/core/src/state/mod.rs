//! Appliance state management.
//!
//! This module provides:
//! - The door × process transition table
//! - `ApplianceController`, which owns the state and drives the collaborators
//! - Cook cycle orchestration with cooperative cancellation

pub mod controller;
mod cycle;
pub mod error;
pub mod machine;

pub use controller::{ApplianceController, ClipNames, ItemReset, ItemSelection, StopOutcome};
pub use cycle::CookCycle;
pub use error::{ControllerError, ControllerResult};
pub use machine::{ApplianceState, TransitionError, Trigger};
