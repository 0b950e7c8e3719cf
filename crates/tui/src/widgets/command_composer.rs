//! Command composer widget with slash command autocomplete.
//!
//! This widget provides a text input field for entering commands, with
//! autocomplete suggestions when the user types a slash command. Parsed
//! commands become the same [`Op`]s the shortcuts and region hits produce.

use crate::event::EventStatus;
use crossterm::event::{KeyCode, KeyEvent};
use mw_protocol::Op;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use thiserror::Error;

/// Available slash commands with their descriptions.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/door", "Open or close the door"),
    ("/item <type>", "Place an item in the appliance"),
    ("/start [secs]", "Start a cook cycle"),
    ("/stop", "Cancel the cycle or open the door"),
    ("/reset", "Remove the current item"),
    ("/hit <region>", "Click a named region of the model"),
    ("/snapshot", "Refresh the appliance state"),
    ("/quit", "Shut down and exit"),
];

/// Why an input line could not be turned into an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Invalid duration '{0}': expected whole seconds")]
    InvalidDuration(String),

    #[error("Invalid command. Commands must start with '/'")]
    NotACommand,
}

/// Command composer state.
#[derive(Debug, Clone, Default)]
pub struct CommandComposer {
    input: String,
    /// Cursor position in characters.
    cursor_pos: usize,
    show_popup: bool,
    /// Selected index in the autocomplete list.
    selected_index: usize,
}

impl CommandComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether the composer owns the keyboard (something has been typed).
    pub fn is_active(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn should_show_popup(&self) -> bool {
        self.show_popup
    }

    /// Get filtered command suggestions based on current input.
    pub fn suggestions(&self) -> Vec<(&'static str, &'static str)> {
        if !self.input.starts_with('/') {
            return Vec::new();
        }

        let filter = self.input.trim();
        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(filter))
            .copied()
            .collect()
    }

    pub fn selected_suggestion(&self) -> Option<(&'static str, &'static str)> {
        self.suggestions().get(self.selected_index).copied()
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = self.byte_pos();
        self.input.insert(byte_pos, c);
        self.cursor_pos += 1;
        self.update_popup_state();
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let byte_pos = self.byte_pos();
            self.input.remove(byte_pos);
            self.update_popup_state();
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
        self.show_popup = false;
        self.selected_index = 0;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.suggestions().len() {
            self.selected_index += 1;
        }
    }

    /// Complete with the currently selected suggestion (Tab key).
    pub fn complete_with_selection(&mut self) {
        if let Some((cmd, _)) = self.selected_suggestion() {
            // Drop the argument placeholder.
            let cmd_name = cmd.split_whitespace().next().unwrap_or(cmd);
            self.input = format!("{cmd_name} ");
            self.cursor_pos = self.input.chars().count();
            self.show_popup = false;
            self.selected_index = 0;
        }
    }

    /// Edit the input. Enter is left to the caller, which submits.
    ///
    /// A `/` typed into an empty composer activates it; any other key is
    /// only consumed while the composer is active.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> EventStatus {
        if !self.is_active() {
            if key_event.code == KeyCode::Char('/') {
                self.insert_char('/');
                return EventStatus::Consumed;
            }
            return EventStatus::NotConsumed;
        }

        match key_event.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Up if self.show_popup => self.move_selection_up(),
            KeyCode::Down if self.show_popup => self.move_selection_down(),
            KeyCode::Tab => self.complete_with_selection(),
            KeyCode::Esc => self.clear(),
            _ => return EventStatus::NotConsumed,
        }
        EventStatus::Consumed
    }

    fn byte_pos(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn update_popup_state(&mut self) {
        self.show_popup = self.input.starts_with('/') && !self.input.contains(' ');

        let suggestions = self.suggestions();
        if self.selected_index >= suggestions.len() {
            self.selected_index = suggestions.len().saturating_sub(1);
        }
    }

    /// Render the input field.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Command (/ commands, d door, s start, x stop, r reset, q quit)");

        let inner = block.inner(area);
        block.render(area, buf);

        let text = format!("> {}", self.input);
        let paragraph = Paragraph::new(text).style(Style::default().fg(Color::Yellow));
        paragraph.render(inner, buf);
    }

    /// Height the popup needs, borders included. Zero when hidden.
    pub fn popup_height(&self) -> u16 {
        if !self.show_popup {
            return 0;
        }
        match self.suggestions().len() {
            0 => 0,
            n => u16::try_from(n).unwrap_or(u16::MAX).saturating_add(2),
        }
    }

    /// Render the autocomplete popup.
    pub fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        if !self.show_popup {
            return;
        }

        let suggestions = self.suggestions();
        if suggestions.is_empty() {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Suggestions")
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(area);
        block.render(area, buf);

        for (i, (cmd, desc)) in suggestions.iter().enumerate() {
            let Ok(offset) = u16::try_from(i) else { break };
            if offset >= inner.height {
                break;
            }

            let style = if i == self.selected_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let line = Line::from(vec![
                Span::styled(format!("{cmd:<18}"), style),
                Span::styled(desc.to_string(), style.fg(Color::Gray)),
            ]);

            buf.set_line(inner.x, inner.y + offset, &line, inner.width);
        }
    }

    /// Parse the current input into an operation.
    ///
    /// Returns `Ok(None)` for blank input.
    pub fn parse_command(&self) -> Result<Option<Op>, CommandError> {
        let input = self.input.trim();

        if input.is_empty() {
            return Ok(None);
        }

        if !input.starts_with('/') {
            return Err(CommandError::NotACommand);
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or(input);
        let arg = parts.next();

        let op = match cmd {
            "/door" => Op::ToggleDoor,
            "/item" => Op::SelectItem {
                item_type: arg.ok_or(CommandError::MissingArgument("item type"))?.to_string(),
            },
            "/start" => {
                let cook_duration_secs = arg
                    .map(|secs| {
                        secs.parse::<u64>()
                            .map_err(|_| CommandError::InvalidDuration(secs.to_string()))
                    })
                    .transpose()?;
                Op::Start { cook_duration_secs }
            }
            "/stop" => Op::Stop,
            "/reset" => Op::ResetItem,
            "/hit" => Op::Hit {
                region: arg.ok_or(CommandError::MissingArgument("region name"))?.to_string(),
            },
            "/snapshot" => Op::GetSnapshot,
            "/quit" => Op::Shutdown,
            _ => return Err(CommandError::Unknown(cmd.to_string())),
        };

        Ok(Some(op))
    }
}
