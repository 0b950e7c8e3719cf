//! Printing session events for headless commands.

use colored::{ColoredString, Colorize};
use mw_protocol::{CycleOutcome, DoorState, Event, NoticeLevel, ProcessState};

/// How events are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    /// One coloured line per event.
    Text,
    /// One JSON object per line, as sent over the wire.
    Json,
}

impl EventFormat {
    pub fn print(self, event: &Event) {
        match self {
            EventFormat::Json => match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::warn!(%err, "Failed to serialize event"),
            },
            EventFormat::Text => {
                if let Some(line) = describe(event) {
                    println!("{line}");
                }
            }
        }
    }
}

/// A coloured description of `event`, or `None` for bookkeeping events.
pub fn describe(event: &Event) -> Option<ColoredString> {
    let line = match event {
        Event::DoorChanged { door } => match door {
            DoorState::Open => "door open".green(),
            DoorState::Closed => "door closed".cyan(),
            DoorState::Opening => "door opening".yellow(),
            DoorState::Closing => "door closing".yellow(),
        },
        Event::ProcessStarted {
            run_id,
            cook_duration_ms,
        } => format!(
            "cycle {run_id} started ({}s)",
            *cook_duration_ms as f64 / 1000.0
        )
        .bold(),
        Event::ProcessFinished { outcome, .. } => match outcome {
            CycleOutcome::Completed => "cycle completed".green().bold(),
            CycleOutcome::Cancelled => "cycle cancelled".yellow().bold(),
            CycleOutcome::Failed(reason) => format!("cycle failed: {reason}").red().bold(),
        },
        Event::ProcessChanged { process } => match process {
            ProcessState::Running => "process running".normal(),
            ProcessState::Idle => "process idle".normal(),
        },
        Event::ItemLoaded { slot } => {
            format!("loaded {} (stage {})", slot.item_type, slot.stage).normal()
        }
        Event::ItemStageAdvanced { slot } => {
            format!("{} advanced to stage {}", slot.item_type, slot.stage).magenta()
        }
        Event::ItemCleared => "item removed".normal(),
        Event::CookingChanged { enabled } => {
            if *enabled {
                "cooking on".red()
            } else {
                "cooking off".dimmed()
            }
        }
        Event::TimerChanged { running } => {
            if *running {
                "timer running".normal()
            } else {
                "timer stopped".dimmed()
            }
        }
        Event::Notice { level, message } => match level {
            NoticeLevel::Info => message.normal(),
            NoticeLevel::Warning => format!("warning: {message}").yellow(),
            NoticeLevel::Error => format!("error: {message}").red(),
        },
        Event::RequestIgnored { operation, reason } => {
            format!("{operation} ignored: {reason}").yellow()
        }
        Event::AffordancesChanged { .. } | Event::Snapshot { .. } => return None,
    };
    Some(line)
}
