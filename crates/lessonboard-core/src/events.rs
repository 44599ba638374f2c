//! Notifications emitted by the whiteboard.

use crate::shapes::ElementId;
use crate::tools::ToolKind;
use serde::Serialize;

/// Something observable changed on the board.
///
/// Events are queued as operations run and must be drained with
/// [`Whiteboard::poll_events`](crate::Whiteboard::poll_events).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// Undo/redo availability may have changed.
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// The working element set changed.
    ElementsChanged,
    /// A different page became active.
    PageChanged { index: usize },
    /// Pages were added, removed, renamed, reordered or re-thumbnailed.
    PagesChanged,
    /// The selected element changed.
    SelectionChanged { selected: Option<ElementId> },
    /// The active tool changed.
    ToolChanged { tool: ToolKind },
}

/// FIFO of pending events.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: Vec<BoardEvent>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: BoardEvent) {
        // Collapse back-to-back duplicates from compound operations.
        if self.events.last() == Some(&event) {
            return;
        }
        self.events.push(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_collapses_adjacent_duplicates() {
        let mut queue = EventQueue::default();
        queue.push(BoardEvent::ElementsChanged);
        queue.push(BoardEvent::ElementsChanged);
        queue.push(BoardEvent::PagesChanged);
        queue.push(BoardEvent::ElementsChanged);
        assert_eq!(
            queue.drain(),
            vec![
                BoardEvent::ElementsChanged,
                BoardEvent::PagesChanged,
                BoardEvent::ElementsChanged
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(BoardEvent::HistoryChanged {
            can_undo: true,
            can_redo: false,
        })
        .unwrap();
        assert_eq!(json["event"], "history_changed");
        assert_eq!(json["can_undo"], true);
    }
}
