//! Snapshot-based undo/redo for the active page.

use crate::shapes::Element;

/// A complete copy of a page's elements at one point in time.
pub type Snapshot = Vec<Element>;

/// Linear undo/redo stack over element-set snapshots.
///
/// Index 0 holds the state the page had when it became active. Committing
/// after an undo drops every snapshot past the current index, so history
/// never branches.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    index: usize,
    limit: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Create a history whose only snapshot is `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            limit: None,
        }
    }

    /// Keep at most `limit` snapshots (at least 1), dropping the oldest.
    /// Index 0 then holds the oldest kept snapshot rather than the baseline.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.max(1));
        self.enforce_limit();
        self
    }

    /// Record a new state, discarding anything that could have been redone.
    pub fn commit(&mut self, snapshot: &[Element]) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot.to_vec());
        self.index = self.snapshots.len() - 1;
        self.enforce_limit();
    }

    /// Step back one snapshot and return a copy of it.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current().to_vec())
    }

    /// Step forward one snapshot and return a copy of it.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current().to_vec())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Replace the whole stack with a single snapshot.
    pub fn reset(&mut self, initial: Snapshot) {
        self.snapshots = vec![initial];
        self.index = 0;
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: a history holds at least one snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Position of the current snapshot.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The snapshot at the current index.
    pub fn current(&self) -> &[Element] {
        &self.snapshots[self.index]
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.snapshots.len() > limit {
            let overflow = self.snapshots.len() - limit;
            self.snapshots.drain(..overflow);
            self.index = self.index.saturating_sub(overflow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Stroke};
    use kurbo::Point;

    fn rect(x: f64) -> Element {
        Element::Rectangle(Rectangle::new(Point::new(x, x), 10.0, 10.0))
    }

    /// Build a history with `n` commits, each adding one element.
    fn history_with(n: usize) -> (History, Vec<Snapshot>) {
        let mut history = History::default();
        let mut working = Vec::new();
        let mut states = vec![Vec::new()];
        for i in 0..n {
            working.push(rect(i as f64));
            history.commit(&working);
            states.push(working.clone());
        }
        (history, states)
    }

    #[test]
    fn test_new_history_has_nothing_to_undo() {
        let history = History::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_commit_advances_index() {
        let (history, _) = history_with(1);
        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        for n in 1..6 {
            let (mut history, states) = history_with(n);
            for _ in 0..n {
                assert!(history.undo().is_some());
            }
            assert!(!history.can_undo());
            assert_eq!(history.current(), states[0].as_slice());
            let mut last = None;
            for _ in 0..n {
                last = history.redo();
            }
            assert_eq!(last.as_ref(), Some(&states[n]));
            assert!(!history.can_redo());
        }
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let (mut history, _) = history_with(4);
        history.undo();
        history.undo();
        history.commit(&[rect(99.0)]);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 4);
        assert_eq!(history.index(), 3);
    }

    #[test]
    fn test_boundaries_are_silent_no_ops() {
        let (mut history, _) = history_with(1);
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 1);
        history.undo();
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_returned_snapshots_are_independent() {
        let (mut history, _) = history_with(2);
        let mut undone = history.undo().unwrap();
        undone.clear();
        undone.push(Element::Freehand(Stroke::new(Point::ZERO)));

        history.redo();
        let again = history.undo().unwrap();
        assert_eq!(again.len(), 1);
        assert!(matches!(again[0], Element::Rectangle(_)));
    }

    #[test]
    fn test_commit_copies_input() {
        let mut history = History::default();
        let mut working = vec![rect(1.0)];
        history.commit(&working);
        working.clear();
        assert_eq!(history.current().len(), 1);
    }

    #[test]
    fn test_reset() {
        let (mut history, _) = history_with(3);
        history.reset(vec![rect(5.0)]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current().len(), 1);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::default().with_limit(3);
        let mut working = Vec::new();
        for i in 0..5 {
            working.push(rect(i as f64));
            history.commit(&working);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(history.current().len(), 3);
    }
}
