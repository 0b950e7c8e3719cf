//! The appliance process controller.
//!
//! `ApplianceController` owns the door and process state, the item slot and
//! the cancellation token of the running cook cycle. It is a cheap handle:
//! clones share the same appliance.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await point. Door motion is awaited through a `watch` channel that is
//! updated on every door transition.

use super::error::{ControllerError, ControllerResult};
use super::machine::{ApplianceState, TransitionError, Trigger};
use crate::assets::{AssetHandle, ItemStageLoader};
use crate::playback::{AnimationPlayback, ClipCompletion};
use mw_protocol::appliance_models::{ApplianceSnapshot, DoorState, ItemSlot};
use mw_protocol::config_models::ClipSettings;
use mw_protocol::ipc::{Event, NoticeLevel, Operation};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Names of the clips the controller drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipNames {
    /// Door clip. Played forward to open, in reverse to close.
    pub door: String,

    /// Timer display clip, played while cooking.
    pub timer: String,
}

impl From<&ClipSettings> for ClipNames {
    fn from(settings: &ClipSettings) -> Self {
        Self {
            door: settings.door.name.clone(),
            timer: settings.timer.name.clone(),
        }
    }
}

impl Default for ClipNames {
    fn default() -> Self {
        Self::from(&ClipSettings::default())
    }
}

/// What a call to [`ApplianceController::stop`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The running cycle was signalled and will unwind through cleanup.
    CancelRequested,

    /// Nothing was running and the door was closed, so it is now opening.
    DoorOpening,

    /// Nothing to do: idle with the door open or moving.
    Ignored,
}

#[derive(Debug, Clone)]
pub(super) struct LoadedItem {
    pub(super) slot: ItemSlot,
    pub(super) handle: AssetHandle,
}

#[derive(Debug, Default)]
pub(super) struct ControllerState {
    pub(super) machine: ApplianceState,
    pub(super) item: Option<LoadedItem>,

    /// Present exactly while a cycle is running.
    pub(super) cancel: Option<CancellationToken>,
    pub(super) run_id: Option<Uuid>,

    pub(super) cooking: bool,
    pub(super) timer_running: bool,
    pub(super) item_load_pending: bool,
    /// A reset arrived while an item was loading; the load is discarded.
    pub(super) reset_requested: bool,
}

struct Inner {
    state: Mutex<ControllerState>,
    door_tx: watch::Sender<DoorState>,
    playback: Arc<dyn AnimationPlayback>,
    loader: Arc<dyn ItemStageLoader>,
    clips: ClipNames,
    events_tx: mpsc::UnboundedSender<Event>,
}

/// Coordinates the door, the cook cycle and the item slot of one appliance.
#[derive(Clone)]
pub struct ApplianceController {
    inner: Arc<Inner>,
}

impl ApplianceController {
    /// Create a controller in the `Closed`/`Idle` state with no item.
    ///
    /// # Arguments
    ///
    /// * `playback` - Backend that plays the door and timer clips
    /// * `loader` - Backend that loads item stage assets
    /// * `clips` - Names of the door and timer clips
    /// * `events_tx` - Channel every state change is published on
    pub fn new(
        playback: Arc<dyn AnimationPlayback>,
        loader: Arc<dyn ItemStageLoader>,
        clips: ClipNames,
        events_tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let (door_tx, _) = watch::channel(DoorState::Closed);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ControllerState::default()),
                door_tx,
                playback,
                loader,
                clips,
                events_tx,
            }),
        }
    }

    /// Point-in-time view of the appliance.
    pub fn snapshot(&self) -> ApplianceSnapshot {
        let state = self.lock();
        ApplianceSnapshot {
            door: state.machine.door,
            process: state.machine.process,
            item: state.item.as_ref().map(|item| item.slot.clone()),
            cooking: state.cooking,
            timer_running: state.timer_running,
            run_id: state.run_id,
        }
    }

    /// Current door and process state.
    pub fn state(&self) -> ApplianceState {
        self.lock().machine
    }

    /// The item in the appliance, if any.
    pub fn item(&self) -> Option<ItemSlot> {
        self.lock().item.as_ref().map(|item| item.slot.clone())
    }

    /// Open a closed door or close an open one.
    ///
    /// Returns immediately with the transient state entered (`Opening` or
    /// `Closing`). The door settles when the clip reports completion; use
    /// [`door_settled`](Self::door_settled) to wait for it.
    ///
    /// # Errors
    ///
    /// `PreconditionViolation` while a cycle is running or the door is moving.
    pub fn toggle_door(&self) -> ControllerResult<DoorState> {
        let state = self.lock();
        let door = self
            .begin_door_motion(state, Trigger::ToggleDoor)
            .map_err(|err| {
                debug!(%err, "Toggle door ignored");
                ControllerError::violation(Operation::ToggleDoor, err)
            })?;
        info!(?door, "Door toggled");
        Ok(door)
    }

    /// Place `item_type` in the appliance at stage 1.
    ///
    /// Any current item is unloaded first. On load failure the slot stays
    /// empty and a notice is published; nothing is retried.
    ///
    /// # Errors
    ///
    /// - `PreconditionViolation` unless the door rests open, nothing is
    ///   running and no other item is loading
    /// - `AssetLoad` if the loader fails
    pub async fn select_item(&self, item_type: &str) -> ControllerResult<ItemSlot> {
        self.begin_select(item_type)?.load().await
    }

    /// Check the selection preconditions and reserve the item slot.
    ///
    /// Until the returned [`ItemSelection`] is loaded or dropped, cook
    /// cycles and other selections are refused.
    ///
    /// # Errors
    ///
    /// `PreconditionViolation`, as for [`select_item`](Self::select_item).
    pub fn begin_select(&self, item_type: &str) -> ControllerResult<ItemSelection> {
        let mut state = self.lock();
        if let Some(reason) = selection_blocker(&state) {
            debug!(item_type, reason, "Item selection ignored");
            return Err(ControllerError::violation(Operation::SelectItem, reason));
        }
        state.item_load_pending = true;

        Ok(ItemSelection {
            controller: self.clone(),
            item_type: item_type.to_string(),
        })
    }

    /// Stop control.
    ///
    /// Cancels the running cycle. While idle with the door resting closed,
    /// opens the door instead. A moving door is never touched.
    pub fn stop(&self) -> StopOutcome {
        let state = self.lock();

        if state.machine.is_running() {
            if let Some(token) = &state.cancel {
                token.cancel();
            }
            info!(run_id = ?state.run_id, "Stop requested, cancelling cook cycle");
            return StopOutcome::CancelRequested;
        }

        if state.machine.door != DoorState::Closed {
            debug!(door = ?state.machine.door, "Stop ignored");
            return StopOutcome::Ignored;
        }

        match self.begin_door_motion(state, Trigger::ToggleDoor) {
            Ok(_) => {
                info!("Stop pressed while idle, opening door");
                StopOutcome::DoorOpening
            }
            Err(err) => {
                debug!(%err, "Stop ignored");
                StopOutcome::Ignored
            }
        }
    }

    /// Cancel the running cycle, if any. Never moves the door.
    ///
    /// Returns whether a cycle was signalled.
    pub fn cancel_cycle(&self) -> bool {
        let state = self.lock();
        match &state.cancel {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove the current item.
    ///
    /// Allowed in every state. Returns the removed slot, or `None` when the
    /// appliance was already empty (in which case nothing happens). An item
    /// that is still loading is discarded once its load finishes.
    pub async fn reset_item(&self) -> Option<ItemSlot> {
        self.begin_reset().unload().await
    }

    /// Clear the item slot now and leave the unload to the returned
    /// [`ItemReset`].
    ///
    /// A selection still loading at this point will not fill the slot.
    pub fn begin_reset(&self) -> ItemReset {
        let mut state = self.lock();
        if state.item_load_pending {
            info!("Reset while an item is loading, it will be discarded");
            state.reset_requested = true;
        }

        let removed = state.item.take();
        if removed.is_some() {
            self.emit(Event::ItemCleared);
        }

        ItemReset {
            controller: self.clone(),
            removed,
        }
    }

    /// Wait until the door is at rest and return where it rests.
    ///
    /// Resolves immediately if the door is not moving. Never resolves while
    /// a door clip fails to report completion.
    pub async fn door_settled(&self) -> DoorState {
        let mut rx = self.inner.door_tx.subscribe();
        let settled = rx.wait_for(|door| door.is_settled()).await.map(|door| *door);
        settled.unwrap_or_else(|_| self.lock().machine.door)
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn loader(&self) -> &dyn ItemStageLoader {
        self.inner.loader.as_ref()
    }

    pub(super) fn playback(&self) -> &dyn AnimationPlayback {
        self.inner.playback.as_ref()
    }

    pub(super) fn clips(&self) -> &ClipNames {
        &self.inner.clips
    }

    pub(super) fn emit(&self, event: Event) {
        let _ = self.inner.events_tx.send(event);
    }

    pub(super) fn notify(&self, level: NoticeLevel, message: String) {
        self.emit(Event::Notice { level, message });
    }

    /// Apply `trigger` and publish whatever changed.
    pub(super) fn transition(
        &self,
        state: &mut ControllerState,
        trigger: Trigger,
    ) -> Result<(), TransitionError> {
        let before = state.machine;
        let after = before.apply(trigger)?;
        state.machine = after;

        debug!(?trigger, from = ?before, to = ?after, "Transition");

        if before.door != after.door {
            self.inner.door_tx.send_replace(after.door);
            self.emit(Event::DoorChanged { door: after.door });
        }
        if before.process != after.process {
            self.emit(Event::ProcessChanged {
                process: after.process,
            });
        }
        if before.affordances() != after.affordances() {
            self.emit(Event::AffordancesChanged {
                affordances: after.affordances(),
            });
        }
        Ok(())
    }

    /// Apply a door trigger, release the lock and start the door clip.
    pub(super) fn begin_door_motion(
        &self,
        mut state: MutexGuard<'_, ControllerState>,
        trigger: Trigger,
    ) -> Result<DoorState, TransitionError> {
        self.transition(&mut state, trigger)?;
        let door = state.machine.door;
        drop(state);

        self.play_door(door);
        Ok(door)
    }

    /// Start the door clip for a door that has just begun moving.
    pub(super) fn play_door(&self, door: DoorState) {
        let clip = &self.inner.clips.door;
        let completion = match door {
            DoorState::Opening => self.inner.playback.play_forward(clip),
            DoorState::Closing => self.inner.playback.play_reverse(clip),
            DoorState::Open | DoorState::Closed => return,
        };
        self.watch_door(completion);
    }

    /// Settle the door once `completion` resolves.
    fn watch_door(&self, completion: ClipCompletion) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                clip = completion.clip(),
                "No runtime to await door clip, door stays in motion"
            );
            return;
        };

        let controller = self.clone();
        runtime.spawn(async move {
            match completion.await {
                Ok(()) => controller.finish_door_motion(),
                Err(err) => warn!(%err, "Door clip did not finish, door stays in motion"),
            }
        });
    }

    fn finish_door_motion(&self) {
        let mut state = self.lock();
        match self.transition(&mut state, Trigger::AnimationFinished) {
            Ok(()) => info!(door = ?state.machine.door, "Door settled"),
            Err(err) => debug!(%err, "Stale door completion ignored"),
        }
    }
}

/// Why an item cannot be selected right now, if anything.
fn selection_blocker(state: &ControllerState) -> Option<&'static str> {
    if state.machine.is_running() {
        Some("a cook cycle is running")
    } else if state.machine.door.is_moving() {
        Some("the door is still moving")
    } else if state.machine.door != DoorState::Open {
        Some("the door is not open")
    } else if state.item_load_pending {
        Some("another item is still loading")
    } else {
        None
    }
}

/// An item selection that passed its precondition checks.
///
/// Holds the load reservation; dropping it releases the reservation
/// without touching the slot.
#[must_use = "the item is only loaded when `load` is awaited"]
pub struct ItemSelection {
    controller: ApplianceController,
    item_type: String,
}

impl ItemSelection {
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Unload the current item and load the selected one at stage 1.
    ///
    /// # Errors
    ///
    /// - `AssetLoad` if the loader fails. The slot is then empty.
    /// - `PreconditionViolation` if the item was reset while loading. The
    ///   loaded asset is released and the slot stays empty.
    pub async fn load(self) -> ControllerResult<ItemSlot> {
        let controller = &self.controller;
        let item_type = self.item_type.as_str();

        let previous = {
            let mut state = controller.lock();
            let previous = state.item.take();
            if previous.is_some() {
                controller.emit(Event::ItemCleared);
            }
            previous
        };
        if let Some(previous) = previous {
            controller.loader().unload(previous.handle).await;
        }

        let handle = match controller.loader().load(item_type, 1).await {
            Ok(handle) => handle,
            Err(source) => {
                warn!(item_type, error = %source, "Item failed to load");
                controller.notify(
                    NoticeLevel::Error,
                    format!("Could not load {item_type}: {source}"),
                );
                return Err(ControllerError::AssetLoad {
                    item_type: item_type.to_string(),
                    stage: 1,
                    source,
                });
            }
        };

        {
            let mut state = controller.lock();
            if !state.reset_requested {
                let slot = ItemSlot::raw(item_type);
                state.item = Some(LoadedItem {
                    slot: slot.clone(),
                    handle,
                });
                controller.emit(Event::ItemLoaded { slot: slot.clone() });
                info!(item_type, %handle, "Item selected");
                return Ok(slot);
            }
        }

        info!(item_type, %handle, "Item reset while loading, discarding it");
        controller.loader().unload(handle).await;
        Err(ControllerError::violation(
            Operation::SelectItem,
            "the item was reset while loading",
        ))
    }
}

impl Drop for ItemSelection {
    fn drop(&mut self) {
        let mut state = self.controller.lock();
        state.item_load_pending = false;
        state.reset_requested = false;
    }
}

/// An item taken out of the slot by [`ApplianceController::begin_reset`].
#[must_use = "the removed item is only unloaded when `unload` is awaited"]
pub struct ItemReset {
    controller: ApplianceController,
    removed: Option<LoadedItem>,
}

impl ItemReset {
    /// Release the removed item's asset. Returns its slot, if there was one.
    pub async fn unload(self) -> Option<ItemSlot> {
        let Some(removed) = self.removed else {
            debug!("Reset ignored: no item loaded");
            return None;
        };

        self.controller.loader().unload(removed.handle).await;
        info!(
            item_type = %removed.slot.item_type,
            stage = removed.slot.stage,
            "Item removed"
        );
        Some(removed.slot)
    }
}
