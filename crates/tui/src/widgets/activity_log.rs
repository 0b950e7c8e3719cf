//! Activity log widget with scrolling support.
//!
//! Shows a timestamped line for each core event worth reading. The view
//! follows new entries until the user scrolls up, and resumes following
//! once scrolled back to the bottom (or with End).

use crate::event::EventStatus;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use std::cell::Cell;

/// Oldest entries are dropped past this many.
const MAX_ENTRIES: usize = 500;

/// How prominent an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn style(self) -> Style {
        match self {
            LogLevel::Info => Style::default().fg(Color::White),
            LogLevel::Warning => Style::default().fg(Color::Yellow),
            LogLevel::Error => Style::default().fg(Color::Red),
        }
    }
}

/// One line of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub text: String,
}

/// Scrollable list of log entries.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    /// Lines scrolled from the top. Ignored while following.
    scroll_offset: usize,
    follow: bool,
    /// Inner height seen by the last render.
    viewport: Cell<usize>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll_offset: 0,
            follow: true,
            viewport: Cell::new(0),
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Append an entry stamped with the current local time.
    pub fn push(&mut self, level: LogLevel, text: impl Into<String>) {
        self.entries.push(LogEntry {
            at: Local::now(),
            level,
            text: text.into(),
        });
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
            self.scroll_offset = self.scroll_offset.saturating_sub(excess);
        }
    }

    /// Largest useful offset for the last known viewport.
    fn max_offset(&self) -> usize {
        self.entries.len().saturating_sub(self.viewport.get())
    }

    /// The offset that will be drawn.
    pub fn offset(&self) -> usize {
        if self.follow {
            self.max_offset()
        } else {
            self.scroll_offset.min(self.max_offset())
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.offset().saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = (self.offset() + lines).min(self.max_offset());
        self.follow = self.scroll_offset >= self.max_offset();
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    /// PageUp/PageDown scroll a page, Home/End jump.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> EventStatus {
        let page = self.viewport.get().max(1);
        match key_event.code {
            KeyCode::PageUp => self.scroll_up(page),
            KeyCode::PageDown => self.scroll_down(page),
            KeyCode::Home => self.scroll_to_top(),
            KeyCode::End => self.scroll_to_bottom(),
            _ => return EventStatus::NotConsumed,
        }
        EventStatus::Consumed
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        self.viewport.set(area.height.saturating_sub(2) as usize);

        let title = if self.follow {
            "Activity".to_string()
        } else {
            "Activity (scrolled, End to follow)".to_string()
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.entries.is_empty() {
            frame.render_widget(Paragraph::new("No activity yet.").block(block), area);
            return;
        }

        let lines: Vec<Line> = self
            .entries
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        entry.at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(entry.text.clone(), entry.level.style()),
                ])
            })
            .collect();

        let offset = self.offset();
        let scroll = u16::try_from(offset).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);

        if self.entries.len() > self.viewport.get() {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(self.max_offset() + 1)
                .position(offset);
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }
}
