//! TUI application state and event loop.
//!
//! This module defines the main `App` struct that manages the TUI state
//! and the event loop using `tokio::select!`.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use mw_protocol::{Event, ItemDefinition, Op, ProcessState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Clear,
    Frame,
};
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::event_handler::{self, KeyAction};
use crate::tui::{Tui, TuiEvent};
use crate::widgets::activity_log::{ActivityLog, LogLevel};
use crate::widgets::status_panel::{render_status_panel, ApplianceView};
use crate::widgets::{CommandComposer, ItemPicker};

/// Redraw interval while a cycle counts down.
const COUNTDOWN_REFRESH: Duration = Duration::from_millis(500);

/// Main TUI application state.
pub struct App {
    /// Appliance state as reported by the core.
    pub view: ApplianceView,
    pub picker: ItemPicker,
    pub log: ActivityLog,
    pub composer: CommandComposer,
    /// Channel to send operations to the session.
    op_tx: Sender<Op>,
    /// Channel to receive events from the session.
    event_rx: UnboundedReceiver<Event>,
    pub should_exit: bool,
}

impl App {
    /// Create a new App with communication channels and the item catalog.
    pub fn new(
        op_tx: Sender<Op>,
        event_rx: UnboundedReceiver<Event>,
        items: Vec<ItemDefinition>,
    ) -> Self {
        Self {
            view: ApplianceView::default(),
            picker: ItemPicker::new(items),
            log: ActivityLog::new(),
            composer: CommandComposer::new(),
            op_tx,
            event_rx,
            should_exit: false,
        }
    }

    /// Main event loop.
    ///
    /// Uses `tokio::select!` to handle keyboard input and core events
    /// concurrently. Returns when the user quits or the session goes away.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();
        let frames = tui.frame_requester();

        frames.schedule_frame();

        while !self.should_exit {
            select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.handle_core_event(event),
                        None => {
                            warn!("Session closed its event channel");
                            self.should_exit = true;
                        }
                    }
                    frames.schedule_frame();
                }
                Some(tui_event) = tui_events.next() => {
                    match tui_event {
                        TuiEvent::Key(key_event) => {
                            self.handle_key_event(key_event);
                            frames.schedule_frame();
                        }
                        TuiEvent::Draw => {
                            tui.draw(|frame| self.render(frame))?;
                            if self.view.snapshot.process == ProcessState::Running {
                                frames.schedule_frame_in(COUNTDOWN_REFRESH);
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle events from the core.
    fn handle_core_event(&mut self, event: Event) {
        event_handler::handle_core_event(&mut self.view, &mut self.log, event);
    }

    /// Offer a key press to the widgets, then to the shortcuts.
    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }

        if self.composer.is_active() && key_event.code == KeyCode::Enter {
            self.submit_command();
            return;
        }

        let item_selection = self.view.affordances.item_selection;
        if self.composer.handle_key_event(key_event).is_consumed()
            || self
                .picker
                .handle_key_event(key_event, item_selection)
                .is_consumed()
            || self.log.handle_key_event(key_event).is_consumed()
        {
            return;
        }

        match event_handler::shortcut_action(key_event, &self.view, &self.picker) {
            KeyAction::Send(op) => self.send(op),
            KeyAction::Quit => self.should_exit = true,
            KeyAction::None => {}
        }
    }

    /// Parse the composer input and send the resulting operation.
    fn submit_command(&mut self) {
        match self.composer.parse_command() {
            Ok(Some(op)) => {
                let quitting = op == Op::Shutdown;
                self.send(op);
                if quitting {
                    self.should_exit = true;
                }
            }
            Ok(None) => {}
            Err(err) => self.log.push(LogLevel::Error, err.to_string()),
        }
        self.composer.clear();
    }

    fn send(&mut self, op: Op) {
        debug!(?op, "Sending op");
        if let Err(err) = self.op_tx.try_send(op) {
            warn!(%err, "Op not delivered");
            self.log
                .push(LogLevel::Error, "Session is not accepting commands");
        }
    }

    /// Render the TUI.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Status and items on top, activity log in the middle, composer at the bottom.
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);

        render_status_panel(frame, top[0], &self.view);
        self.picker
            .render(frame, top[1], self.view.affordances.item_selection);
        self.log.render(frame, rows[1]);
        self.composer.render(rows[2], frame.buffer_mut());

        // The suggestion popup overlays the bottom of the activity log.
        let popup_height = self.composer.popup_height().min(rows[1].height);
        if popup_height > 0 {
            let popup = Rect {
                x: rows[1].x,
                y: rows[1].y + rows[1].height - popup_height,
                width: rows[1].width,
                height: popup_height,
            };
            frame.render_widget(Clear, popup);
            self.composer.render_popup(popup, frame.buffer_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use mw_core::config::models::AppConfig;
    use mw_core::session::ApplianceSession;
    use mw_protocol::{DoorState, ItemSlot};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc::{self, Receiver, UnboundedSender};

    fn catalog() -> Vec<ItemDefinition> {
        ["popcorn", "pizza"]
            .into_iter()
            .map(|name| ItemDefinition {
                name: name.to_string(),
                label: String::new(),
                description: String::new(),
            })
            .collect()
    }

    fn test_app() -> (App, Receiver<Op>, UnboundedSender<Event>) {
        let (op_tx, op_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (App::new(op_tx, event_rx, catalog()), op_rx, event_tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::from(code));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn open_door(app: &mut App) {
        app.handle_core_event(Event::Snapshot {
            snapshot: mw_protocol::ApplianceSnapshot {
                door: DoorState::Open,
                ..Default::default()
            },
        });
    }

    #[test]
    fn test_app_renders_all_panels() {
        let (app, _op_rx, _event_tx) = test_app();
        let text = screen(&app);

        assert!(text.contains("Appliance"));
        assert!(text.contains("Items"));
        assert!(text.contains("Activity"));
        assert!(text.contains("Command"));
        assert!(text.contains("popcorn"));
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _op_rx, _event_tx) = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_exit);

        let (mut app, _op_rx, _event_tx) = test_app();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_exit);
    }

    #[test]
    fn test_shortcut_sends_op() {
        let (mut app, mut op_rx, _event_tx) = test_app();

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('x'));

        assert_eq!(op_rx.try_recv().unwrap(), Op::ToggleDoor);
        assert_eq!(op_rx.try_recv().unwrap(), Op::Stop);
    }

    #[test]
    fn test_typing_a_command_does_not_trigger_shortcuts() {
        let (mut app, mut op_rx, _event_tx) = test_app();

        type_text(&mut app, "/start 5");
        assert!(op_rx.try_recv().is_err());
        assert!(!app.should_exit);

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            op_rx.try_recv().unwrap(),
            Op::Start {
                cook_duration_secs: Some(5)
            }
        );
        assert!(!app.composer.is_active());
    }

    #[test]
    fn test_popup_is_drawn_while_typing() {
        let (mut app, _op_rx, _event_tx) = test_app();
        press(&mut app, KeyCode::Char('/'));

        let text = screen(&app);
        assert!(text.contains("Suggestions"));
        assert!(text.contains("/snapshot"));
    }

    #[test]
    fn test_invalid_command_is_logged() {
        let (mut app, mut op_rx, _event_tx) = test_app();

        type_text(&mut app, "/bake");
        press(&mut app, KeyCode::Enter);

        assert!(op_rx.try_recv().is_err());
        let last = app.log.entries().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.text, "Unknown command: /bake");
    }

    #[test]
    fn test_quit_command_shuts_down_session() {
        let (mut app, mut op_rx, _event_tx) = test_app();

        type_text(&mut app, "/quit");
        press(&mut app, KeyCode::Enter);

        assert_eq!(op_rx.try_recv().unwrap(), Op::Shutdown);
        assert!(app.should_exit);
    }

    #[test]
    fn test_item_picker_follows_affordance() {
        let (mut app, mut op_rx, _event_tx) = test_app();

        // Door closed: arrows and Enter do nothing.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.picker.selected_index(), 0);
        assert!(op_rx.try_recv().is_err());

        open_door(&mut app);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            op_rx.try_recv().unwrap(),
            Op::SelectItem {
                item_type: "pizza".to_string()
            }
        );
    }

    #[test]
    fn test_core_events_reach_the_screen() {
        let (mut app, _op_rx, _event_tx) = test_app();

        app.handle_core_event(Event::ItemLoaded {
            slot: ItemSlot::raw("popcorn"),
        });

        assert_eq!(app.view.snapshot.item, Some(ItemSlot::raw("popcorn")));
        let text = screen(&app);
        assert!(text.contains("popcorn (stage 1)"));
        assert!(text.contains("Loaded popcorn (stage 1)"));
    }

    #[test]
    fn test_full_op_queue_is_reported() {
        let (op_tx, _op_rx) = mpsc::channel(1);
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let mut app = App::new(op_tx, event_rx, catalog());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(
            app.log.entries().last().map(|entry| entry.text.as_str()),
            Some("Session is not accepting commands")
        );
    }

    /// Feed session events into the app until `done` holds.
    async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
        while !done(app) {
            let event = tokio::time::timeout(Duration::from_secs(30), app.event_rx.recv())
                .await
                .expect("Timed out waiting for session")
                .expect("Session closed");
            app.handle_core_event(event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortcuts_drive_a_session() {
        let (op_tx, op_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = ApplianceSession::from_config(&AppConfig::default(), event_tx);
        let session = tokio::spawn(session.run(op_rx));

        let mut app = App::new(op_tx, event_rx, catalog());

        press(&mut app, KeyCode::Char('d'));
        pump_until(&mut app, |app| app.view.snapshot.door == DoorState::Open).await;
        assert!(app.view.affordances.item_selection);

        press(&mut app, KeyCode::Char('d'));
        pump_until(&mut app, |app| app.view.snapshot.door == DoorState::Closed).await;

        // Toggling again right away is ignored while the door settles.
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('d'));
        pump_until(&mut app, |app| {
            app.log
                .entries()
                .iter()
                .any(|entry| entry.text.starts_with("toggle door ignored"))
        })
        .await;

        type_text(&mut app, "/quit");
        press(&mut app, KeyCode::Enter);
        session.await.unwrap().unwrap();
    }
}
