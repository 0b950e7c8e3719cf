//! Runtime appliance state models.
//!
//! This module defines the door and process state enums, the item slot,
//! and the derived control affordances published to user interfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Highest cook stage an item can reach.
///
/// Stage 1 is the raw item; every completed cook cycle advances one stage
/// until this cap is reached.
pub const MAX_STAGE: u8 = 3;

/// Position of the appliance door.
///
/// `Opening` and `Closing` are transient: they are left only when the
/// door clip reports that it has finished playing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorState {
    /// Door is shut. This is the state at startup.
    #[default]
    Closed,

    /// Door clip is playing forward.
    Opening,

    /// Door is fully open.
    Open,

    /// Door clip is playing in reverse.
    Closing,
}

impl DoorState {
    /// Whether the door is at rest (not mid-animation).
    pub fn is_settled(self) -> bool {
        matches!(self, DoorState::Open | DoorState::Closed)
    }

    /// Whether a door animation is currently playing.
    pub fn is_moving(self) -> bool {
        !self.is_settled()
    }

    /// The state the door will rest in once the current motion finishes.
    ///
    /// Settled states map to themselves.
    pub fn resting(self) -> DoorState {
        match self {
            DoorState::Closed | DoorState::Closing => DoorState::Closed,
            DoorState::Open | DoorState::Opening => DoorState::Open,
        }
    }
}

/// Whether a cook cycle is in flight.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    /// No cook cycle is running.
    #[default]
    Idle,

    /// A cook cycle is running and can be cancelled with stop.
    Running,
}

/// The item currently placed in the appliance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ItemSlot {
    /// Item identifier, e.g. `popcorn`.
    pub item_type: String,

    /// Cook stage, `1..=MAX_STAGE`.
    pub stage: u8,
}

impl ItemSlot {
    /// A freshly placed, raw item.
    pub fn raw(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            stage: 1,
        }
    }

    /// Whether another cook cycle can still advance this item.
    pub fn can_advance(&self) -> bool {
        self.stage < MAX_STAGE
    }

    /// The slot after one more completed cook cycle, or `None` at the cap.
    pub fn advanced(&self) -> Option<ItemSlot> {
        self.can_advance().then(|| ItemSlot {
            item_type: self.item_type.clone(),
            stage: self.stage + 1,
        })
    }
}

/// Enabled/disabled state of every user-facing control.
///
/// Always derived from the door and process state with [`Affordances::derive`],
/// never stored independently.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
pub struct Affordances {
    /// Item buttons: only while the door rests open and nothing is running.
    pub item_selection: bool,

    /// Clicking the door toggles it.
    pub door: bool,

    /// Start control.
    pub start: bool,

    /// Stop control. Always reachable.
    pub stop: bool,

    /// Reset control. Always reachable.
    pub reset: bool,
}

impl Affordances {
    /// Derive control states from the appliance state.
    pub fn derive(door: DoorState, process: ProcessState) -> Self {
        let idle_and_settled = process == ProcessState::Idle && door.is_settled();
        Self {
            item_selection: idle_and_settled && door == DoorState::Open,
            door: idle_and_settled,
            start: idle_and_settled,
            stop: true,
            reset: true,
        }
    }
}

/// How a cook cycle ended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "kind", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleOutcome {
    /// The full cook duration elapsed.
    Completed,

    /// Stop was pressed (or the cycle was abandoned) before the end.
    Cancelled,

    /// The cycle hit an unexpected error and was cleaned up.
    Failed(String),
}

/// Summary of one finished cook cycle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct CycleReport {
    #[ts(type = "string")]
    pub run_id: Uuid,
    pub outcome: CycleOutcome,
    /// The item slot as it stood after cleanup.
    pub item: Option<ItemSlot>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Point-in-time view of the whole appliance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
pub struct ApplianceSnapshot {
    pub door: DoorState,
    pub process: ProcessState,
    pub item: Option<ItemSlot>,

    /// Cooking side effects (light, fire) are active.
    pub cooking: bool,

    /// The timer display animation is playing.
    pub timer_running: bool,

    /// Identifier of the running cycle, if any.
    #[ts(type = "string | null")]
    pub run_id: Option<Uuid>,
}

impl ApplianceSnapshot {
    pub fn affordances(&self) -> Affordances {
        Affordances::derive(self.door, self.process)
    }
}
