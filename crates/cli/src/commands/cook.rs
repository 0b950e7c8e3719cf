//! `microwave cook`: run one cycle headless.
//!
//! Drives a session the way a user would: open the door, place the item,
//! press start (and optionally stop), then wait for the door to reopen.
//! Every event is printed as it arrives.

use crate::output::EventFormat;
use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use mw_core::session::ApplianceSession;
use mw_protocol::{CycleOutcome, DoorState, Event, NoticeLevel, Op};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CookOptions {
    pub item: Option<String>,
    pub seconds: Option<u64>,
    pub stop_after: Option<u64>,
    pub json: bool,
}

pub async fn run(root: &Path, options: CookOptions) -> Result<()> {
    let config = super::load(root).await?;

    if let Some(item) = &options.item {
        if !config.items.is_empty() && config.item(item).is_none() {
            bail!("Unknown item '{item}'. Run `microwave items` to list the catalog.");
        }
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (op_tx, op_rx) = mpsc::channel(16);
    let session = tokio::spawn(ApplianceSession::from_config(&config, events_tx).run(op_rx));

    let mut events = EventFeed {
        rx: events_rx,
        format: if options.json {
            EventFormat::Json
        } else {
            EventFormat::Text
        },
        door: DoorState::default(),
    };

    let outcome = drive(&op_tx, &mut events, &options).await;

    // Shutdown cancels the cycle if driving bailed halfway.
    let _ = op_tx.send(Op::Shutdown).await;
    drop(op_tx);
    session.await?.map_err(|e| eyre!(e))?;
    events.drain();

    match outcome? {
        CycleOutcome::Completed | CycleOutcome::Cancelled => Ok(()),
        CycleOutcome::Failed(reason) => bail!("Cycle failed: {reason}"),
    }
}

async fn drive(
    op_tx: &mpsc::Sender<Op>,
    events: &mut EventFeed,
    options: &CookOptions,
) -> Result<CycleOutcome> {
    if let Some(item) = &options.item {
        send(op_tx, Op::ToggleDoor).await?;
        events.until(door_is(DoorState::Open)).await?;

        send(
            op_tx,
            Op::SelectItem {
                item_type: item.clone(),
            },
        )
        .await?;
        let loaded = events
            .until(|e| {
                matches!(
                    e,
                    Event::ItemLoaded { .. }
                        | Event::RequestIgnored { .. }
                        | Event::Notice {
                            level: NoticeLevel::Error,
                            ..
                        }
                )
            })
            .await?;
        if !matches!(loaded, Event::ItemLoaded { .. }) {
            bail!("Could not place '{item}' in the appliance");
        }
    }

    send(
        op_tx,
        Op::Start {
            cook_duration_secs: options.seconds,
        },
    )
    .await?;
    let started = events
        .until(|e| matches!(e, Event::ProcessStarted { .. } | Event::RequestIgnored { .. }))
        .await?;
    if let Event::RequestIgnored { reason, .. } = started {
        bail!("Start was ignored: {reason}");
    }

    let stopper = options.stop_after.map(|secs| {
        let op_tx = op_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!("Pressing stop");
            let _ = op_tx.send(Op::Stop).await;
        })
    });

    let finished = events
        .until(|e| matches!(e, Event::ProcessFinished { .. }))
        .await?;
    if let Some(stopper) = stopper {
        stopper.abort();
    }
    let Event::ProcessFinished { outcome, .. } = finished else {
        bail!("Expected the cycle to finish");
    };

    // Cleanup reopens the door.
    if events.door != DoorState::Open {
        events.until(door_is(DoorState::Open)).await?;
    }

    Ok(outcome)
}

async fn send(op_tx: &mpsc::Sender<Op>, op: Op) -> Result<()> {
    op_tx
        .send(op)
        .await
        .map_err(|_| eyre!("Session stopped unexpectedly"))
}

fn door_is(door: DoorState) -> impl Fn(&Event) -> bool {
    move |event| matches!(event, Event::DoorChanged { door: d } if *d == door)
}

/// Session events, printed as they are consumed.
struct EventFeed {
    rx: mpsc::UnboundedReceiver<Event>,
    format: EventFormat,
    /// Door state as of the last consumed event.
    door: DoorState,
}

impl EventFeed {
    /// Consume events up to and including the first one matching `predicate`.
    async fn until(&mut self, predicate: impl Fn(&Event) -> bool) -> Result<Event> {
        loop {
            let event = self
                .rx
                .recv()
                .await
                .ok_or_else(|| eyre!("Session closed its event channel"))?;
            self.consume(&event);
            if predicate(&event) {
                return Ok(event);
            }
        }
    }

    /// Print whatever is still queued.
    fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.consume(&event);
        }
    }

    fn consume(&mut self, event: &Event) {
        if let Event::DoorChanged { door } = event {
            self.door = *door;
        }
        self.format.print(event);
    }
}
