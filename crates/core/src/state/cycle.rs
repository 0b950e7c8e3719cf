//! Cook cycle orchestration.
//!
//! A cycle closes an open door, cooks for the requested duration, advances
//! the item one stage and opens the door again. Stop cancels the cycle
//! cooperatively; whatever happens, a drop guard runs the cleanup that
//! switches cooking off and returns the appliance to `Idle` with the door
//! heading open.

use super::controller::{ApplianceController, LoadedItem};
use super::error::{ControllerError, ControllerResult};
use super::machine::{ApplianceState, TransitionError, Trigger};
use chrono::{DateTime, Utc};
use mw_protocol::appliance_models::{CycleOutcome, CycleReport, DoorState, ProcessState};
use mw_protocol::ipc::{Event, NoticeLevel, Operation};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Why a cycle left the happy path.
#[derive(Debug)]
enum CycleInterrupt {
    Cancelled,
    Failed(String),
}

impl From<TransitionError> for CycleInterrupt {
    fn from(err: TransitionError) -> Self {
        CycleInterrupt::Failed(err.to_string())
    }
}

/// Runs the cycle cleanup when dropped.
///
/// Covers normal completion, cancellation, failures and the `start` future
/// itself being dropped mid-cycle.
struct CycleGuard {
    controller: ApplianceController,
    run_id: Uuid,
    outcome: Option<CycleOutcome>,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(CycleOutcome::Cancelled);
        self.controller.finish_cycle(self.run_id, outcome);
    }
}

/// A cook cycle that has entered `Running`.
///
/// Dropping it without running it cancels the cycle and cleans up at once.
#[must_use = "a cook cycle only progresses when run"]
pub struct CookCycle {
    guard: CycleGuard,
    token: CancellationToken,
    cook_duration: Duration,
    started_at: DateTime<Utc>,
}

impl CookCycle {
    pub fn run_id(&self) -> Uuid {
        self.guard.run_id
    }

    /// Drive the cycle to the end and clean up.
    pub async fn run(mut self) -> CycleReport {
        let controller = self.guard.controller.clone();
        let run_id = self.guard.run_id;

        let outcome = match controller.run_cycle(&self.token, self.cook_duration).await {
            Ok(()) => CycleOutcome::Completed,
            Err(CycleInterrupt::Cancelled) => CycleOutcome::Cancelled,
            Err(CycleInterrupt::Failed(reason)) => {
                error!(%run_id, %reason, "Cook cycle failed");
                CycleOutcome::Failed(reason)
            }
        };

        self.guard.outcome = Some(outcome.clone());
        let started_at = self.started_at;
        drop(self);

        CycleReport {
            run_id,
            outcome,
            item: controller.item(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

impl ApplianceController {
    /// Run one cook cycle of `cook_duration`.
    ///
    /// The door may be open or closed but must not be moving. The call
    /// resolves once the cycle has been cleaned up; the door is then open or
    /// opening. A cycle cancelled with [`stop`](Self::stop) reports
    /// `CycleOutcome::Cancelled` and leaves the item stage unchanged. A stop
    /// that arrives after the stage advanced, while the door reopens, still
    /// reports `Completed`.
    ///
    /// # Errors
    ///
    /// `PreconditionViolation` when a cycle is already running, the door is
    /// moving or an item is still loading. Nothing changes in that case.
    pub async fn start(&self, cook_duration: Duration) -> ControllerResult<CycleReport> {
        let cycle = self.begin_cycle(cook_duration)?;
        Ok(cycle.run().await)
    }

    /// Check the start preconditions and enter `Running`.
    ///
    /// The returned [`CookCycle`] must be run to make progress. Callers that
    /// need requests applied in order (a `stop` right after a `start`)
    /// begin the cycle synchronously and run it on a separate task.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn begin_cycle(&self, cook_duration: Duration) -> ControllerResult<CookCycle> {
        let mut state = self.lock();

        if state.item_load_pending {
            debug!("Start ignored: an item is still loading");
            return Err(ControllerError::violation(
                Operation::Start,
                "an item is still loading",
            ));
        }

        self.transition(&mut state, Trigger::Start).map_err(|err| {
            debug!(%err, "Start ignored");
            ControllerError::violation(Operation::Start, err)
        })?;

        let token = CancellationToken::new();
        let run_id = Uuid::new_v4();
        state.cancel = Some(token.clone());
        state.run_id = Some(run_id);

        self.emit(Event::ProcessStarted {
            run_id,
            cook_duration_ms: u64::try_from(cook_duration.as_millis()).unwrap_or(u64::MAX),
        });
        info!(%run_id, ?cook_duration, "Cook cycle started");

        Ok(CookCycle {
            guard: CycleGuard {
                controller: self.clone(),
                run_id,
                outcome: None,
            },
            token,
            cook_duration,
            started_at: Utc::now(),
        })
    }

    async fn run_cycle(
        &self,
        token: &CancellationToken,
        cook_duration: Duration,
    ) -> Result<(), CycleInterrupt> {
        if token.is_cancelled() {
            return Err(CycleInterrupt::Cancelled);
        }

        if self.cycle_door_from(DoorState::Open)? {
            self.await_door(token).await?;
        }

        self.switch_cooking_on();

        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(CycleInterrupt::Cancelled),
            _ = tokio::time::sleep(cook_duration) => {}
        }

        self.advance_item(token).await?;

        // The item is cooked from here on. A stop while the door reopens
        // only ends the wait early; the opening clip keeps playing.
        if self.cycle_door_from(DoorState::Closed)? && self.await_door(token).await.is_err() {
            debug!("Stop during the final door open, cycle already completed");
        }

        Ok(())
    }

    /// Start moving the door if it rests at `from`. Returns whether it moved.
    fn cycle_door_from(&self, from: DoorState) -> Result<bool, CycleInterrupt> {
        let state = self.lock();
        if state.machine.door != from {
            return Ok(false);
        }
        self.begin_door_motion(state, Trigger::CycleDoor)?;
        Ok(true)
    }

    async fn await_door(&self, token: &CancellationToken) -> Result<DoorState, CycleInterrupt> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CycleInterrupt::Cancelled),
            door = self.door_settled() => Ok(door),
        }
    }

    fn switch_cooking_on(&self) {
        {
            let mut state = self.lock();
            state.cooking = true;
            state.timer_running = true;
            self.emit(Event::CookingChanged { enabled: true });
            self.emit(Event::TimerChanged { running: true });

            if state.item.is_none() {
                info!("No item loaded, cooking anyway");
            }
        }

        let _ = self.playback().play_forward(&self.clips().timer);
    }

    /// Replace the item with its next stage.
    ///
    /// The new stage is loaded before the old one is unloaded, so a failed
    /// load keeps the current item.
    async fn advance_item(&self, token: &CancellationToken) -> Result<(), CycleInterrupt> {
        let current = self.lock().item.clone();

        let Some(current) = current else {
            debug!("No item to advance");
            return Ok(());
        };

        let Some(next) = current.slot.advanced() else {
            info!(
                item_type = %current.slot.item_type,
                stage = current.slot.stage,
                "Item is fully cooked, stage unchanged"
            );
            return Ok(());
        };

        let handle = match self.loader().load(&next.item_type, next.stage).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(item_type = %next.item_type, stage = next.stage, error = %err, "Next stage failed to load");
                self.notify(
                    NoticeLevel::Warning,
                    format!("{} stays at stage {}: {err}", current.slot.item_type, current.slot.stage),
                );
                return Ok(());
            }
        };

        if token.is_cancelled() {
            self.loader().unload(handle).await;
            return Err(CycleInterrupt::Cancelled);
        }

        let replaced = {
            let mut state = self.lock();
            let still_current = state
                .item
                .as_ref()
                .is_some_and(|item| item.handle == current.handle);
            if still_current {
                state.item = Some(LoadedItem {
                    slot: next.clone(),
                    handle,
                });
                self.emit(Event::ItemStageAdvanced { slot: next.clone() });
            }
            still_current
        };

        if replaced {
            self.loader().unload(current.handle).await;
            info!(item_type = %next.item_type, stage = next.stage, "Item advanced");
        } else {
            debug!("Item changed while cooking, discarding new stage");
            self.loader().unload(handle).await;
        }

        Ok(())
    }

    /// Cleanup for every cycle exit path.
    ///
    /// Synchronous so it can run from `Drop`: door motion is requested but
    /// never awaited here.
    fn finish_cycle(&self, run_id: Uuid, outcome: CycleOutcome) {
        let mut state = self.lock();

        let timer_was_running = state.timer_running;
        if state.cooking {
            state.cooking = false;
            self.emit(Event::CookingChanged { enabled: false });
        }
        if state.timer_running {
            state.timer_running = false;
            self.emit(Event::TimerChanged { running: false });
        }
        state.cancel = None;
        state.run_id = None;

        let opening = state.machine.door == DoorState::Closed
            && match self.transition(&mut state, Trigger::CycleDoor) {
                Ok(()) => true,
                Err(err) => {
                    warn!(%err, "Could not open door during cleanup");
                    false
                }
            };
        let closing = state.machine.door == DoorState::Closing;

        if let Err(err) = self.transition(&mut state, Trigger::Finish) {
            error!(%run_id, %err, "Cleanup found no running cycle");
        }
        self.emit(Event::ProcessFinished {
            run_id,
            outcome: outcome.clone(),
        });
        drop(state);

        if timer_was_running {
            self.playback().stop(&self.clips().timer);
        }
        if opening {
            self.play_door(DoorState::Opening);
        }
        if closing {
            self.reopen_when_settled();
        }

        info!(%run_id, ?outcome, "Cook cycle finished");
    }

    /// Open the door once a close interrupted by cancellation has finished.
    ///
    /// The close is never reversed mid-motion.
    fn reopen_when_settled(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No runtime to reopen door on, door stays closed");
            return;
        };

        let controller = self.clone();
        runtime.spawn(async move {
            controller.door_settled().await;

            let state = controller.lock();
            if state.machine != ApplianceState::new(DoorState::Closed, ProcessState::Idle) {
                debug!(state = ?state.machine, "Door reopen skipped");
                return;
            }
            match controller.begin_door_motion(state, Trigger::ToggleDoor) {
                Ok(_) => info!("Reopening door after cancelled cycle"),
                Err(err) => debug!(%err, "Door reopen skipped"),
            }
        });
    }
}
