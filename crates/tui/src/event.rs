//! Event handling types for the TUI.
//!
//! Key events are offered to the focused widgets first (the command
//! composer, then the item picker, then the activity log). Each widget says
//! whether it used the key; whatever nobody consumed falls through to the
//! single-key appliance shortcuts.

/// Status of an event after being handled by a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// The widget used the event; stop offering it.
    Consumed,
    /// The widget ignored the event; pass it to the next handler.
    NotConsumed,
}

impl EventStatus {
    pub fn is_consumed(self) -> bool {
        self == EventStatus::Consumed
    }
}
