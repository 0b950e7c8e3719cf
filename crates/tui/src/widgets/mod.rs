//! TUI widgets module.
//!
//! This module contains the panels the app lays out: appliance status,
//! item picker, activity log and command composer.

pub mod activity_log;
pub mod command_composer;
pub mod item_picker;
pub mod status_panel;

pub use activity_log::ActivityLog;
pub use command_composer::CommandComposer;
pub use item_picker::ItemPicker;
pub use status_panel::ApplianceView;
