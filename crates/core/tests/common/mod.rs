//! Common test utilities and helpers for controller and session tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Test fixtures (controllers wired to scripted collaborators, projects on disk)
//! - Custom assertions over event streams
//! - Scripted playback and loader collaborators

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod assertions;
pub mod fixtures;
pub mod mock_collaborators;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_collaborators::*;
