//! # mw-core
//!
//! Appliance process controller and its collaborators for microwave-kit.
//!
//! This crate provides:
//! - Configuration loading from `.microwave/` directory
//! - Project scaffolding from embedded templates
//! - Animation playback and item stage loading collaborators
//! - The door/process state machine and cook cycle controller
//! - Input dispatch from named regions and the Op/Event session loop
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`init`]: `.microwave/` project scaffolding
//! - [`playback`]: AnimationPlayback trait and timed backend
//! - [`assets`]: ItemStageLoader trait and model directory backend
//! - [`state`]: Transition table and `ApplianceController`
//! - [`dispatch`]: Region hit resolution
//! - [`session`]: Op/Event loop around one controller

pub mod assets;
pub mod config;
pub mod dispatch;
pub mod init;
pub mod playback;
pub mod session;
pub mod state;
