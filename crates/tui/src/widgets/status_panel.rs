//! Status panel widget showing the appliance state in a table.
//!
//! One row per aspect of the appliance (door, process, item, cooking side
//! effects, timer, current run), followed by the control affordances so the
//! user can see which shortcuts will be accepted.

use mw_protocol::{Affordances, ApplianceSnapshot, CycleOutcome, DoorState, ProcessState};
use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::Frame;
use std::time::{Duration, Instant};

/// What the front end knows about the appliance, built from core events.
#[derive(Debug, Clone)]
pub struct ApplianceView {
    pub snapshot: ApplianceSnapshot,
    pub affordances: Affordances,
    /// Duration of the running cycle, from `ProcessStarted`.
    pub cook_duration: Option<Duration>,
    /// When the running cycle started, for the countdown.
    pub cycle_started: Option<Instant>,
    pub last_outcome: Option<CycleOutcome>,
}

impl Default for ApplianceView {
    fn default() -> Self {
        let snapshot = ApplianceSnapshot::default();
        Self {
            affordances: snapshot.affordances(),
            snapshot,
            cook_duration: None,
            cycle_started: None,
            last_outcome: None,
        }
    }
}

impl ApplianceView {
    /// Seconds left in the running cycle, if one is running.
    pub fn remaining_secs(&self, now: Instant) -> Option<u64> {
        let started = self.cycle_started?;
        let total = self.cook_duration?;
        Some(
            total
                .saturating_sub(now.saturating_duration_since(started))
                .as_secs(),
        )
    }
}

/// Renders the status panel for `view`.
pub fn render_status_panel(frame: &mut Frame, area: Rect, view: &ApplianceView) {
    let snapshot = &view.snapshot;

    let process_text = match (snapshot.process, view.remaining_secs(Instant::now())) {
        (ProcessState::Running, Some(left)) => format!("Running ({left}s left)"),
        (ProcessState::Running, None) => "Running".to_string(),
        (ProcessState::Idle, _) => "Idle".to_string(),
    };

    let item_text = match &snapshot.item {
        Some(slot) => format!("{} (stage {})", slot.item_type, slot.stage),
        None => "empty".to_string(),
    };

    let run_text = snapshot
        .run_id
        .map(|id| short_id(&id))
        .unwrap_or_else(|| "-".to_string());

    let last_text = match &view.last_outcome {
        Some(CycleOutcome::Completed) => "completed".to_string(),
        Some(CycleOutcome::Cancelled) => "cancelled".to_string(),
        Some(CycleOutcome::Failed(reason)) => format!("failed: {reason}"),
        None => "-".to_string(),
    };

    let rows = vec![
        Row::new(vec![
            Cell::from("Door"),
            Cell::from(format!("{:?}", snapshot.door)).style(door_style(snapshot.door)),
        ]),
        Row::new(vec![
            Cell::from("Process"),
            Cell::from(process_text).style(process_style(snapshot.process)),
        ]),
        Row::new(vec![Cell::from("Item"), Cell::from(item_text)]),
        Row::new(vec![
            Cell::from("Cooking"),
            on_off_cell(snapshot.cooking, Color::Red),
        ]),
        Row::new(vec![
            Cell::from("Timer"),
            on_off_cell(snapshot.timer_running, Color::Yellow),
        ]),
        Row::new(vec![Cell::from("Run"), Cell::from(run_text)]),
        Row::new(vec![Cell::from("Last cycle"), Cell::from(last_text)]),
        Row::new(vec![
            Cell::from("Controls"),
            Cell::from(affordance_line(&view.affordances)),
        ]),
    ];

    let widths = [Constraint::Length(12), Constraint::Min(10)];

    let table = Table::new(rows, widths).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Appliance")
            .style(Style::default().fg(Color::White)),
    );

    frame.render_widget(table, area);
}

fn door_style(door: DoorState) -> Style {
    match door {
        DoorState::Open => Style::default().fg(Color::Green),
        DoorState::Closed => Style::default().fg(Color::Cyan),
        DoorState::Opening | DoorState::Closing => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    }
}

fn process_style(process: ProcessState) -> Style {
    match process {
        ProcessState::Running => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        ProcessState::Idle => Style::default().fg(Color::DarkGray),
    }
}

fn on_off_cell(on: bool, color: Color) -> Cell<'static> {
    if on {
        Cell::from("on").style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    } else {
        Cell::from("off").style(Style::default().fg(Color::DarkGray))
    }
}

/// Control names, dimmed when the control is disabled.
fn affordance_line(affordances: &Affordances) -> Line<'static> {
    let controls = [
        ("door", affordances.door),
        ("items", affordances.item_selection),
        ("start", affordances.start),
        ("stop", affordances.stop),
        ("reset", affordances.reset),
    ];

    let mut spans = Vec::with_capacity(controls.len() * 2);
    for (name, enabled) in controls {
        let style = if enabled {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        };
        spans.push(Span::styled(name, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// First 8 characters of a run id.
pub fn short_id(uuid: &uuid::Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mw_protocol::ItemSlot;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use uuid::Uuid;

    fn render(view: &ApplianceView) -> ratatui::buffer::Buffer {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_status_panel(frame, area, view);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn content(buffer: &ratatui::buffer::Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_initial_state() {
        let text = content(&render(&ApplianceView::default()));

        assert!(text.contains("Appliance"));
        assert!(text.contains("Closed"));
        assert!(text.contains("Idle"));
        assert!(text.contains("empty"));
        assert!(text.contains("Controls"));
    }

    #[test]
    fn test_render_running_cycle_with_item() {
        let run_id = Uuid::new_v4();
        let view = ApplianceView {
            snapshot: ApplianceSnapshot {
                door: DoorState::Closed,
                process: ProcessState::Running,
                item: Some(ItemSlot {
                    item_type: "popcorn".to_string(),
                    stage: 2,
                }),
                cooking: true,
                timer_running: true,
                run_id: Some(run_id),
            },
            affordances: Affordances::derive(DoorState::Closed, ProcessState::Running),
            cook_duration: Some(Duration::from_secs(10)),
            cycle_started: Some(Instant::now()),
            last_outcome: None,
        };

        let text = content(&render(&view));

        assert!(text.contains("Running"));
        assert!(text.contains("s left"));
        assert!(text.contains("popcorn (stage 2)"));
        assert!(text.contains(&short_id(&run_id)));
    }

    #[test]
    fn test_disabled_controls_are_dimmed() {
        let view = ApplianceView {
            affordances: Affordances::derive(DoorState::Opening, ProcessState::Idle),
            ..ApplianceView::default()
        };
        let buffer = render(&view);

        let mut dimmed = 0;
        for y in 0..buffer.area().height {
            for x in 0..buffer.area().width {
                let cell = &buffer[(x, y)];
                if cell.modifier.contains(Modifier::CROSSED_OUT) && cell.symbol() != " " {
                    dimmed += 1;
                }
            }
        }

        // "door", "items" and "start" are disabled while the door moves.
        assert_eq!(dimmed, "door".len() + "items".len() + "start".len());
    }

    #[test]
    fn test_remaining_secs_counts_down() {
        let started = Instant::now();
        let view = ApplianceView {
            cook_duration: Some(Duration::from_secs(10)),
            cycle_started: Some(started),
            ..ApplianceView::default()
        };

        assert_eq!(
            view.remaining_secs(started + Duration::from_secs(4)),
            Some(6)
        );
        assert_eq!(
            view.remaining_secs(started + Duration::from_secs(30)),
            Some(0)
        );
        assert_eq!(ApplianceView::default().remaining_secs(started), None);
    }

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("12345678-9abc-def0-1234-56789abcdef0").unwrap();
        assert_eq!(short_id(&id), "12345678");
    }
}
