//! Inter-process communication protocol.
//!
//! This module defines the message types for asynchronous communication
//! between a front end (terminal UI, headless CLI, browser bridge) and the
//! core appliance session.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from a front end to the core
//! - `Event`: State changes published by the core
//!
//! Communication is channel-based so the front end stays responsive while
//! a cook cycle is suspended on its timer.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::appliance_models::{
    Affordances, ApplianceSnapshot, CycleOutcome, DoorState, ItemSlot, ProcessState,
};

/// Operations sent from a front end to the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "selectItem",
///   "payload": { "item_type": "popcorn" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Open a closed door or close an open one.
    ToggleDoor,

    /// Place an item (at stage 1) in the appliance.
    SelectItem { item_type: String },

    /// Run a cook cycle.
    ///
    /// Without a duration the configured default is used.
    Start { cook_duration_secs: Option<u64> },

    /// Cancel the running cycle, or open a closed idle door.
    Stop,

    /// Remove the current item.
    ResetItem,

    /// A pointer hit on a named region of the appliance model.
    ///
    /// Names that do not match a configured region are ignored.
    Hit { region: String },

    /// Request a `Snapshot` event with the current state.
    GetSnapshot,

    /// Cancel any running cycle and stop the session.
    Shutdown,
}

/// The controller operation a request was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ToggleDoor,
    SelectItem,
    Start,
    Stop,
    ResetItem,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ToggleDoor => "toggle door",
            Operation::SelectItem => "select item",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::ResetItem => "reset item",
        };
        f.write_str(name)
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Events sent from the core to front ends.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "doorChanged",
///   "payload": { "door": "OPENING" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The door entered a new state.
    DoorChanged { door: DoorState },

    /// A cook cycle began.
    ProcessStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        /// Cook wait in milliseconds.
        #[ts(type = "number")]
        cook_duration_ms: u64,
    },

    /// A cook cycle finished and was cleaned up.
    ProcessFinished {
        #[ts(type = "string")]
        run_id: Uuid,
        outcome: CycleOutcome,
    },

    /// The process state changed.
    ProcessChanged { process: ProcessState },

    /// A new item was placed at stage 1.
    ItemLoaded { slot: ItemSlot },

    /// The item moved to its next cook stage.
    ItemStageAdvanced { slot: ItemSlot },

    /// The item slot was emptied.
    ItemCleared,

    /// Cooking side effects (light, fire) were switched.
    CookingChanged { enabled: bool },

    /// The timer display animation was started or stopped.
    TimerChanged { running: bool },

    /// Control affordances were recomputed.
    AffordancesChanged { affordances: Affordances },

    /// Something the user should see, e.g. a failed model load.
    Notice { level: NoticeLevel, message: String },

    /// A request was dropped because its precondition did not hold.
    RequestIgnored { operation: Operation, reason: String },

    /// Reply to `Op::GetSnapshot`.
    Snapshot { snapshot: ApplianceSnapshot },
}
