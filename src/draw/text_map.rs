//! Derived text state, reconstructed by folding the action log.
//!
//! Text blocks are never mutated in place. Their current content and position
//! is the fold of every [`Action::TextAdd`] / [`Action::TextMove`] for an id,
//! in log order, optionally overridden by an in-progress drag. Recomputing the
//! fold on demand keeps undo/redo trivially correct.

use super::action::{Action, TextId};
use super::color::Color;
use crate::util::{Point, Rect};

/// Current state of one text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub id: TextId,
    pub value: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Color,
    pub width: f64,
    pub height: f64,
}

impl TextBlock {
    /// Anchor (top-left corner) of the block.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Hit-test box: anchor plus measured dimensions.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.value.split('\n')
    }
}

/// Live position of a text block being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOverride {
    pub id: TextId,
    pub position: Point,
}

/// Every text block derivable from a log, in order of first definition.
#[derive(Debug, Clone, Default)]
pub struct TextMap {
    blocks: Vec<TextBlock>,
}

impl TextMap {
    /// Folds `actions` into the current text map.
    ///
    /// A `TextAdd` replaces content, size, color, measurements and anchor of
    /// its id (creating the block on first sight); a `TextMove` replaces the
    /// anchor of a known id. `drag` then overrides the anchor of its id.
    pub fn fold(actions: &[Action], drag: Option<DragOverride>) -> Self {
        let mut map = TextMap::default();

        for action in actions {
            match action {
                Action::TextAdd {
                    id,
                    value,
                    x,
                    y,
                    size,
                    color,
                    measured_width,
                    measured_height,
                } => {
                    let block = TextBlock {
                        id: *id,
                        value: value.clone(),
                        x: *x,
                        y: *y,
                        size: *size,
                        color: *color,
                        width: *measured_width,
                        height: *measured_height,
                    };
                    match map.get_mut(*id) {
                        Some(existing) => *existing = block,
                        None => map.blocks.push(block),
                    }
                }
                Action::TextMove { id, to, .. } => {
                    if let Some(block) = map.get_mut(*id) {
                        block.x = to.x;
                        block.y = to.y;
                    }
                }
                Action::Stroke { .. } | Action::RectOutline { .. } => {}
            }
        }

        if let Some(drag) = drag
            && let Some(block) = map.get_mut(drag.id)
        {
            block.x = drag.position.x;
            block.y = drag.position.y;
        }

        map
    }

    pub fn get(&self, id: TextId) -> Option<&TextBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }

    fn get_mut(&mut self, id: TextId) -> Option<&mut TextBlock> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    /// Returns the topmost block containing `point`.
    ///
    /// Blocks defined later sit on top, so the search runs newest-first.
    pub fn hit_test(&self, point: Point) -> Option<&TextBlock> {
        self.blocks.iter().rev().find(|block| block.contains(point))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};

    fn text_add(id: TextId, value: &str, x: f64, y: f64) -> Action {
        Action::TextAdd {
            id,
            value: value.to_string(),
            x,
            y,
            size: 20.0,
            color: RED,
            measured_width: 40.0,
            measured_height: 26.0,
        }
    }

    fn text_move(id: TextId, from: (f64, f64), to: (f64, f64)) -> Action {
        Action::TextMove {
            id,
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn move_overrides_position() {
        let log = vec![text_add(1, "hello", 0.0, 0.0), text_move(1, (0.0, 0.0), (10.0, 20.0))];
        let map = TextMap::fold(&log, None);
        assert_eq!(map.get(1).unwrap().position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn later_add_replaces_content_and_keeps_identity() {
        let mut log = vec![text_add(1, "hello", 0.0, 0.0)];
        log.push(Action::TextAdd {
            id: 1,
            value: "hello world".to_string(),
            x: 0.0,
            y: 0.0,
            size: 32.0,
            color: BLUE,
            measured_width: 120.0,
            measured_height: 42.0,
        });

        let map = TextMap::fold(&log, None);
        assert_eq!(map.len(), 1);
        let block = map.get(1).unwrap();
        assert_eq!(block.value, "hello world");
        assert_eq!(block.size, 32.0);
        assert_eq!(block.color, BLUE);
        assert_eq!(block.width, 120.0);
    }

    #[test]
    fn moves_of_other_ids_do_not_leak() {
        let log = vec![
            text_add(2, "other", 50.0, 50.0),
            text_move(2, (50.0, 50.0), (90.0, 90.0)),
            text_add(1, "mine", 5.0, 6.0),
            text_move(7, (0.0, 0.0), (300.0, 300.0)),
        ];
        let map = TextMap::fold(&log, None);
        assert_eq!(map.get(1).unwrap().position(), Point::new(5.0, 6.0));
        assert!(map.get(7).is_none());
    }

    #[test]
    fn drag_override_wins_over_log() {
        let log = vec![text_add(1, "hello", 0.0, 0.0), text_move(1, (0.0, 0.0), (10.0, 20.0))];
        let drag = DragOverride {
            id: 1,
            position: Point::new(70.0, 80.0),
        };
        let map = TextMap::fold(&log, Some(drag));
        assert_eq!(map.get(1).unwrap().position(), Point::new(70.0, 80.0));
    }

    #[test]
    fn hit_test_prefers_most_recently_defined_block() {
        let log = vec![text_add(1, "under", 0.0, 0.0), text_add(2, "over", 10.0, 10.0)];
        let map = TextMap::fold(&log, None);

        assert_eq!(map.hit_test(Point::new(15.0, 15.0)).unwrap().id, 2);
        assert_eq!(map.hit_test(Point::new(2.0, 2.0)).unwrap().id, 1);
        assert_eq!(map.hit_test(Point::new(40.0, 26.0)).unwrap().id, 1);
        assert!(map.hit_test(Point::new(200.0, 200.0)).is_none());
    }

    #[test]
    fn editing_keeps_original_stacking_order() {
        let log = vec![
            text_add(1, "first", 0.0, 0.0),
            text_add(2, "second", 0.0, 0.0),
            text_add(1, "first edited", 0.0, 0.0),
        ];
        let map = TextMap::fold(&log, None);
        let ids: Vec<TextId> = map.iter().map(|block| block.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
