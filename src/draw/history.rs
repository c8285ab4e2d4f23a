//! Append-only action log with linear undo/redo.

use super::action::Action;

/// The committed action log plus its redo buffer.
///
/// `committed` is in chronological order (first = bottom of the scene).
/// Appending always empties the redo buffer: a new edit invalidates the redo
/// branch. Every operation is total; undo/redo on an empty sequence is a no-op.
#[derive(Debug, Clone, Default)]
pub struct History {
    committed: Vec<Action>,
    /// Undone actions; the last element is the most recently undone.
    redo: Vec<Action>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a freshly committed action and drops the redo branch.
    pub fn append(&mut self, action: Action) {
        log::debug!(
            "Committing {} (log length {})",
            action.label(),
            self.committed.len() + 1
        );
        self.committed.push(action);
        self.redo.clear();
    }

    /// Moves the most recent committed action onto the redo buffer.
    ///
    /// Returns `true` if anything changed.
    pub fn undo(&mut self) -> bool {
        match self.committed.pop() {
            Some(action) => {
                log::debug!("Undo {}", action.label());
                self.redo.push(action);
                true
            }
            None => false,
        }
    }

    /// Re-commits the most recently undone action.
    ///
    /// The remaining redo buffer is kept so repeated calls redo several steps.
    /// Returns `true` if anything changed.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(action) => {
                log::debug!("Redo {}", action.label());
                self.committed.push(action);
                true
            }
            None => false,
        }
    }

    /// Discards both the log and the redo buffer.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Committed actions in chronological order.
    pub fn actions(&self) -> &[Action] {
        &self.committed
    }

    /// Undone actions, most recently undone first.
    pub fn redo_stack(&self) -> impl Iterator<Item = &Action> {
        self.redo.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{StrokeKind, color::RED};
    use crate::util::Point;

    fn stroke(n: usize) -> Action {
        Action::Stroke {
            kind: StrokeKind::Pen,
            color: RED,
            width: 2.0,
            points: vec![Point::new(0.0, 0.0), Point::new(n as f64, 1.0)],
        }
    }

    #[test]
    fn undo_all_then_redo_all_round_trips() {
        for n in 0..8 {
            let actions: Vec<Action> = (0..n).map(stroke).collect();
            let mut history = History::new();
            for action in &actions {
                history.append(action.clone());
            }

            for _ in 0..n {
                assert!(history.undo());
            }
            assert!(history.is_empty());
            assert!(!history.can_undo());
            let reversed: Vec<Action> = actions.iter().rev().cloned().collect();
            assert_eq!(history.redo_stack().cloned().collect::<Vec<_>>(), reversed);

            for _ in 0..n {
                assert!(history.redo());
            }
            assert_eq!(history.actions(), actions.as_slice());
            assert!(!history.can_redo());
        }
    }

    #[test]
    fn append_after_undo_clears_redo() {
        let mut history = History::new();
        history.append(stroke(1));
        history.append(stroke(2));
        history.undo();
        assert!(history.can_redo());

        history.append(stroke(3));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn redo_does_not_drop_deeper_redo_entries() {
        let mut history = History::new();
        history.append(stroke(1));
        history.append(stroke(2));
        history.undo();
        history.undo();

        assert!(history.redo());
        assert!(history.can_redo());
        assert_eq!(history.actions(), &[stroke(1)]);
    }

    #[test]
    fn undo_and_redo_on_empty_are_noops() {
        let mut history = History::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(!history.undo());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn clear_discards_both_sequences() {
        let mut history = History::new();
        history.append(stroke(1));
        history.append(stroke(2));
        history.undo();
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
