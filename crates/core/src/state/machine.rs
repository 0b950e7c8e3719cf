//! Door × process transition table.
//!
//! The combined appliance state only changes through [`ApplianceState::apply`].
//! Every trigger either yields the next state or a [`TransitionError`]
//! naming the condition that blocked it; there are no other code paths
//! that write the door or process state.

use mw_protocol::appliance_models::{Affordances, DoorState, ProcessState};
use thiserror::Error;

/// Combined door and process state. Starts `Closed`/`Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ApplianceState {
    pub door: DoorState,
    pub process: ProcessState,
}

/// Everything that can move the appliance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// User door toggle. Only while idle.
    ToggleDoor,

    /// Door motion requested by a running cook cycle.
    CycleDoor,

    /// The door clip reported completion.
    AnimationFinished,

    /// A cook cycle begins.
    Start,

    /// A cook cycle was cleaned up.
    Finish,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("the door is still moving ({0:?})")]
    DoorMoving(DoorState),

    #[error("the door is not moving")]
    DoorNotMoving,

    #[error("a cook cycle is running")]
    ProcessRunning,

    #[error("no cook cycle is running")]
    ProcessIdle,
}

impl ApplianceState {
    pub fn new(door: DoorState, process: ProcessState) -> Self {
        Self { door, process }
    }

    /// Compute the state after `trigger`.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the trigger is not valid in the current
    /// state. The current state is never modified.
    pub fn apply(self, trigger: Trigger) -> Result<ApplianceState, TransitionError> {
        match trigger {
            Trigger::ToggleDoor => {
                self.require_idle()?;
                self.require_settled()?;
                Ok(self.with_door(flip(self.door)))
            }
            Trigger::CycleDoor => {
                self.require_running()?;
                self.require_settled()?;
                Ok(self.with_door(flip(self.door)))
            }
            Trigger::AnimationFinished => {
                if self.door.is_settled() {
                    return Err(TransitionError::DoorNotMoving);
                }
                Ok(self.with_door(self.door.resting()))
            }
            Trigger::Start => {
                self.require_idle()?;
                self.require_settled()?;
                Ok(self.with_process(ProcessState::Running))
            }
            Trigger::Finish => {
                self.require_running()?;
                Ok(self.with_process(ProcessState::Idle))
            }
        }
    }

    /// Control affordances for this state.
    pub fn affordances(self) -> Affordances {
        Affordances::derive(self.door, self.process)
    }

    pub fn is_running(self) -> bool {
        self.process == ProcessState::Running
    }

    fn require_idle(self) -> Result<(), TransitionError> {
        match self.process {
            ProcessState::Idle => Ok(()),
            ProcessState::Running => Err(TransitionError::ProcessRunning),
        }
    }

    fn require_running(self) -> Result<(), TransitionError> {
        match self.process {
            ProcessState::Running => Ok(()),
            ProcessState::Idle => Err(TransitionError::ProcessIdle),
        }
    }

    fn require_settled(self) -> Result<(), TransitionError> {
        if self.door.is_moving() {
            return Err(TransitionError::DoorMoving(self.door));
        }
        Ok(())
    }

    fn with_door(self, door: DoorState) -> Self {
        Self { door, ..self }
    }

    fn with_process(self, process: ProcessState) -> Self {
        Self { process, ..self }
    }
}

/// Motion that takes a settled door to its other resting state.
fn flip(door: DoorState) -> DoorState {
    match door {
        DoorState::Closed => DoorState::Opening,
        DoorState::Open => DoorState::Closing,
        moving => moving,
    }
}
