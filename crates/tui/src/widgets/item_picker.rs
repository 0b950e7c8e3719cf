//! Item picker listing the catalog.
//!
//! The list is only interactive while the appliance allows item selection
//! (door resting open, nothing cooking). Otherwise it is drawn dimmed and
//! its keys fall through to the other handlers.

use crate::event::EventStatus;
use crossterm::event::{KeyCode, KeyEvent};
use mw_protocol::ItemDefinition;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Catalog items with a highlighted entry.
#[derive(Debug, Clone, Default)]
pub struct ItemPicker {
    items: Vec<ItemDefinition>,
    selected: usize,
}

impl ItemPicker {
    pub fn new(items: Vec<ItemDefinition>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The highlighted item, if the catalog is not empty.
    pub fn selected(&self) -> Option<&ItemDefinition> {
        self.items.get(self.selected)
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    /// Move the highlight with the arrow keys while selection is allowed.
    pub fn handle_key_event(&mut self, key_event: KeyEvent, enabled: bool) -> EventStatus {
        if !enabled || self.items.is_empty() {
            return EventStatus::NotConsumed;
        }
        match key_event.code {
            KeyCode::Up => {
                self.select_previous();
                EventStatus::Consumed
            }
            KeyCode::Down => {
                self.select_next();
                EventStatus::Consumed
            }
            _ => EventStatus::NotConsumed,
        }
    }

    /// Render the list; `enabled` mirrors the item-selection affordance.
    pub fn render(&self, frame: &mut Frame, area: Rect, enabled: bool) {
        let title = if enabled {
            "Items (Enter to load)"
        } else {
            "Items (open the door to choose)"
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.items.is_empty() {
            let list = List::new(vec![ListItem::new("No items configured.")]).block(block);
            frame.render_widget(list, area);
            return;
        }

        let text_style = if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let rows: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(item.display_label().to_string()).style(text_style))
            .collect();

        let mut list = List::new(rows).block(block);
        let mut state = ListState::default();
        if enabled {
            list = list
                .highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            state.select(Some(self.selected));
        }

        frame.render_stateful_widget(list, area, &mut state);
    }
}
