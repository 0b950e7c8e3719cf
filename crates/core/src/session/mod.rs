//! Session loop for one appliance.
//!
//! The `ApplianceSession` is the bridge between front ends and the
//! controller. Front ends send [`Op`]s on a channel; the session applies
//! them in order and every resulting state change reaches the front end as
//! an [`Event`].
//!
//! Operations that suspend (cook cycles, item loads, resets) take effect on
//! the controller in arrival order and then finish on their own task, so a
//! `Stop` sent while a cycle is cooking is handled immediately and a reset
//! sent while an item loads discards that item.

use crate::assets::ModelDirLoader;
use crate::config::models::AppConfig;
use crate::dispatch::RegionMap;
use crate::playback::TimedPlayback;
use crate::state::{ApplianceController, ClipNames, ControllerError, StopOutcome};
use anyhow::{bail, Result};
use mw_protocol::ipc::{Event, Op};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Owns a controller and applies incoming operations to it.
pub struct ApplianceSession {
    controller: ApplianceController,
    regions: RegionMap,
    default_cook_duration: Duration,
    events_tx: mpsc::UnboundedSender<Event>,

    /// Cycles, loads and resets in flight.
    tasks: JoinSet<()>,
}

/// Whether the loop keeps going after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

impl ApplianceSession {
    /// Create a session around an existing controller.
    ///
    /// # Arguments
    ///
    /// * `controller` - The controller to drive
    /// * `regions` - Region names for resolving `Op::Hit`
    /// * `default_cook_duration` - Used when `Op::Start` carries no duration
    /// * `events_tx` - Channel for session-level events (the controller's own
    ///   sender should feed the same channel)
    pub fn new(
        controller: ApplianceController,
        regions: RegionMap,
        default_cook_duration: Duration,
        events_tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            controller,
            regions,
            default_cook_duration,
            events_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Create a session with the timed playback and model directory
    /// backends described by `config`.
    pub fn from_config(config: &AppConfig, events_tx: mpsc::UnboundedSender<Event>) -> Self {
        let playback = Arc::new(TimedPlayback::from_settings(&config.global.clips));

        let mut loader = ModelDirLoader::new(config.models_dir());
        if !config.items.is_empty() {
            loader = loader.with_known_items(config.items.iter().map(|item| item.name.clone()));
        }

        let controller = ApplianceController::new(
            playback,
            Arc::new(loader),
            ClipNames::from(&config.global.clips),
            events_tx.clone(),
        );

        Self::new(
            controller,
            RegionMap::from_names(&config.global.regions),
            config.cook_duration(),
            events_tx,
        )
    }

    /// The controller this session drives.
    pub fn controller(&self) -> &ApplianceController {
        &self.controller
    }

    /// Process operations until `Op::Shutdown` or until the channel closes.
    ///
    /// On exit any running cycle is cancelled and every task in flight is
    /// awaited, so the cycle cleanup has run when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle, load or reset task panicked.
    pub async fn run(mut self, mut ops_rx: mpsc::Receiver<Op>) -> Result<()> {
        info!("Session started");
        let mut panicked = 0usize;

        loop {
            tokio::select! {
                op = ops_rx.recv() => {
                    let Some(op) = op else {
                        debug!("Op channel closed");
                        break;
                    };
                    if self.handle_op(op) == Flow::Shutdown {
                        break;
                    }
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(err) = joined {
                        error!(%err, "Session task failed");
                        panicked += 1;
                    }
                }
            }
        }

        if self.controller.cancel_cycle() {
            info!("Cancelled running cycle for shutdown");
        }
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                error!(%err, "Session task failed");
                panicked += 1;
            }
        }

        info!("Session stopped");

        if panicked > 0 {
            bail!("{panicked} session task(s) failed");
        }
        Ok(())
    }

    fn handle_op(&mut self, op: Op) -> Flow {
        debug!(?op, "Handling op");

        match op {
            Op::ToggleDoor => {
                if let Err(err) = self.controller.toggle_door() {
                    report(&self.events_tx, err);
                }
            }
            Op::SelectItem { item_type } => match self.controller.begin_select(&item_type) {
                Ok(selection) => {
                    let events_tx = self.events_tx.clone();
                    self.tasks.spawn(async move {
                        if let Err(err) = selection.load().await {
                            report(&events_tx, err);
                        }
                    });
                }
                Err(err) => report(&self.events_tx, err),
            },
            Op::Start { cook_duration_secs } => {
                let cook_duration = cook_duration_secs
                    .map(Duration::from_secs)
                    .unwrap_or(self.default_cook_duration);

                match self.controller.begin_cycle(cook_duration) {
                    Ok(cycle) => {
                        self.tasks.spawn(async move {
                            let cycle_report = cycle.run().await;
                            debug!(
                                run_id = %cycle_report.run_id,
                                outcome = ?cycle_report.outcome,
                                "Cycle finished"
                            );
                        });
                    }
                    Err(err) => report(&self.events_tx, err),
                }
            }
            Op::Stop => {
                if self.controller.stop() == StopOutcome::Ignored {
                    debug!("Stop had nothing to do");
                }
            }
            Op::ResetItem => {
                let reset = self.controller.begin_reset();
                self.tasks.spawn(async move {
                    reset.unload().await;
                });
            }
            Op::Hit { region } => match self.regions.op_for(&region) {
                Some(op) => {
                    debug!(%region, ?op, "Region hit");
                    return self.handle_op(op);
                }
                None => debug!(%region, "Hit on unmatched region ignored"),
            },
            Op::GetSnapshot => {
                let _ = self.events_tx.send(Event::Snapshot {
                    snapshot: self.controller.snapshot(),
                });
            }
            Op::Shutdown => {
                info!("Shutdown requested");
                return Flow::Shutdown;
            }
        }

        Flow::Continue
    }
}

/// Publish a controller error. Precondition violations become
/// `RequestIgnored`; load failures already raised a notice.
fn report(events_tx: &mpsc::UnboundedSender<Event>, err: ControllerError) {
    match err {
        ControllerError::PreconditionViolation { operation, reason } => {
            let _ = events_tx.send(Event::RequestIgnored { operation, reason });
        }
        err @ ControllerError::AssetLoad { .. } => debug!(%err, "Load failure reported"),
    }
}
