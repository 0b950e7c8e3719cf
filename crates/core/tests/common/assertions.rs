//! Custom assertion helpers over event streams.

use mw_protocol::appliance_models::{ApplianceSnapshot, CycleOutcome, DoorState, ProcessState};
use mw_protocol::ipc::{Event, NoticeLevel};

/// Door states in the order they were published.
#[allow(dead_code)]
pub fn door_history(events: &[Event]) -> Vec<DoorState> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::DoorChanged { door } => Some(*door),
            _ => None,
        })
        .collect()
}

/// Outcomes of every `ProcessFinished` event.
#[allow(dead_code)]
pub fn finished_outcomes(events: &[Event]) -> Vec<CycleOutcome> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ProcessFinished { outcome, .. } => Some(outcome.clone()),
            _ => None,
        })
        .collect()
}

/// Whether a notice of `level` was published.
#[allow(dead_code)]
pub fn has_notice(events: &[Event], level: NoticeLevel) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::Notice { level: l, .. } if *l == level))
}

/// Number of `ProcessStarted` events.
#[allow(dead_code)]
pub fn started_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::ProcessStarted { .. }))
        .count()
}

/// Assert the appliance is at rest: idle, door open, nothing cooking.
#[allow(dead_code)]
pub fn assert_idle_and_open(snapshot: &ApplianceSnapshot) {
    assert_eq!(snapshot.process, ProcessState::Idle, "Process should be idle");
    assert_eq!(snapshot.door, DoorState::Open, "Door should be open");
    assert!(!snapshot.cooking, "Cooking should be off");
    assert!(!snapshot.timer_running, "Timer should be stopped");
    assert!(snapshot.run_id.is_none(), "No run should be active");
}

/// Assert that the cleanup events of one cycle appear in order.
///
/// Cooking and the timer are switched off before the process goes idle,
/// and `ProcessFinished` comes last. Only valid for cycles that got as far
/// as cooking.
#[allow(dead_code)]
pub fn assert_cleanup_sequence(events: &[Event]) {
    let position = |predicate: &dyn Fn(&Event) -> bool| {
        events
            .iter()
            .position(|event| predicate(event))
            .unwrap_or_else(|| panic!("Missing cleanup event in {events:?}"))
    };

    let cooking_off = position(&|e| matches!(e, Event::CookingChanged { enabled: false }));
    let timer_off = position(&|e| matches!(e, Event::TimerChanged { running: false }));
    let idle = position(&|e| {
        matches!(
            e,
            Event::ProcessChanged {
                process: ProcessState::Idle
            }
        )
    });
    let finished = position(&|e| matches!(e, Event::ProcessFinished { .. }));

    assert!(cooking_off < idle, "Cooking should stop before idle");
    assert!(timer_off < idle, "Timer should stop before idle");
    assert!(idle < finished, "ProcessFinished should follow idle");
}
