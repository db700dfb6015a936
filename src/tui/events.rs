//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::piston::ExecutionOutcome;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Terminal resized to the given width and height
    Resize(u16, u16),
    /// Periodic timer used to expire notifications
    Tick,
    /// A spawned run has settled
    ExecutionFinished { seq: u64, outcome: ExecutionOutcome },
    /// A side effect finished and wants to feed an action back
    Feedback(super::app::Action),
}
