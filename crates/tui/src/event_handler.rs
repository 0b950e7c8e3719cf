//! Event handling utilities for the TUI.
//!
//! This module provides functions for handling different types of events:
//! - Core events: folded into the [`ApplianceView`] and the activity log
//! - Keyboard shortcuts: mapped to the same `Op`s the command composer emits

use crate::widgets::activity_log::{ActivityLog, LogLevel};
use crate::widgets::item_picker::ItemPicker;
use crate::widgets::status_panel::{short_id, ApplianceView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mw_protocol::{CycleOutcome, Event, NoticeLevel, Op};
use std::time::{Duration, Instant};

/// Apply an event received from the core.
pub fn handle_core_event(view: &mut ApplianceView, log: &mut ActivityLog, event: Event) {
    if let Some((level, text)) = describe_event(&event) {
        log.push(level, text);
    }

    let state = &mut view.snapshot;
    match event {
        Event::DoorChanged { door } => state.door = door,
        Event::ProcessStarted {
            run_id,
            cook_duration_ms,
        } => {
            state.run_id = Some(run_id);
            view.cook_duration = Some(Duration::from_millis(cook_duration_ms));
            view.cycle_started = Some(Instant::now());
        }
        Event::ProcessFinished { outcome, .. } => {
            state.run_id = None;
            view.cook_duration = None;
            view.cycle_started = None;
            view.last_outcome = Some(outcome);
        }
        Event::ProcessChanged { process } => state.process = process,
        Event::ItemLoaded { slot } | Event::ItemStageAdvanced { slot } => {
            state.item = Some(slot)
        }
        Event::ItemCleared => state.item = None,
        Event::CookingChanged { enabled } => state.cooking = enabled,
        Event::TimerChanged { running } => state.timer_running = running,
        Event::AffordancesChanged { affordances } => view.affordances = affordances,
        Event::Snapshot { snapshot } => {
            view.affordances = snapshot.affordances();
            view.snapshot = snapshot;
        }
        Event::Notice { .. } | Event::RequestIgnored { .. } => {}
    }
}

/// The activity log line for an event, if it deserves one.
pub fn describe_event(event: &Event) -> Option<(LogLevel, String)> {
    let line = match event {
        Event::DoorChanged { door } => (LogLevel::Info, format!("Door {door:?}")),
        Event::ProcessStarted {
            run_id,
            cook_duration_ms,
        } => (
            LogLevel::Info,
            format!(
                "Cycle {} started ({}s)",
                short_id(run_id),
                *cook_duration_ms as f64 / 1000.0
            ),
        ),
        Event::ProcessFinished { run_id, outcome } => {
            let id = short_id(run_id);
            match outcome {
                CycleOutcome::Completed => (LogLevel::Info, format!("Cycle {id} completed")),
                CycleOutcome::Cancelled => (LogLevel::Warning, format!("Cycle {id} cancelled")),
                CycleOutcome::Failed(reason) => {
                    (LogLevel::Error, format!("Cycle {id} failed: {reason}"))
                }
            }
        }
        Event::ItemLoaded { slot } => (
            LogLevel::Info,
            format!("Loaded {} (stage {})", slot.item_type, slot.stage),
        ),
        Event::ItemStageAdvanced { slot } => (
            LogLevel::Info,
            format!("{} is now stage {}", slot.item_type, slot.stage),
        ),
        Event::ItemCleared => (LogLevel::Info, "Item removed".to_string()),
        Event::CookingChanged { enabled: true } => (LogLevel::Info, "Cooking".to_string()),
        Event::Notice { level, message } => {
            let level = match level {
                NoticeLevel::Info => LogLevel::Info,
                NoticeLevel::Warning => LogLevel::Warning,
                NoticeLevel::Error => LogLevel::Error,
            };
            (level, message.clone())
        }
        Event::RequestIgnored { operation, reason } => (
            LogLevel::Warning,
            format!("{operation} ignored: {reason}"),
        ),
        Event::CookingChanged { enabled: false }
        | Event::ProcessChanged { .. }
        | Event::TimerChanged { .. }
        | Event::AffordancesChanged { .. }
        | Event::Snapshot { .. } => return None,
    };
    Some(line)
}

/// What a key press means when no widget consumed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Send(Op),
    Quit,
    None,
}

/// Map an unconsumed key press to an appliance shortcut.
///
/// Enter loads the highlighted item, but only while item selection is
/// afforded; the other shortcuts are always sent and the session reports
/// anything it ignores.
pub fn shortcut_action(key_event: KeyEvent, view: &ApplianceView, picker: &ItemPicker) -> KeyAction {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('d') => KeyAction::Send(Op::ToggleDoor),
        KeyCode::Char('s') => KeyAction::Send(Op::Start {
            cook_duration_secs: None,
        }),
        KeyCode::Char('x') => KeyAction::Send(Op::Stop),
        KeyCode::Char('r') => KeyAction::Send(Op::ResetItem),
        KeyCode::Enter if view.affordances.item_selection => match picker.selected() {
            Some(item) => KeyAction::Send(Op::SelectItem {
                item_type: item.name.clone(),
            }),
            None => KeyAction::None,
        },
        _ => KeyAction::None,
    }
}
