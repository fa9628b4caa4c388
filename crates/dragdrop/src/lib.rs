//! DragDrop Utilities
//!
//! Framework-free drag tracking for sortable lists.
//! Pointer drags use a movement threshold to distinguish click from drag;
//! keyboard sorting moves a cursor over the list and drops on request.
//! Both report the same `MoveEvent`: "item `moved` goes where `target` is".

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// A completed move gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveEvent<Id> {
    /// Item being dragged
    pub moved: Id,
    /// Item whose slot the dragged item takes
    pub target: Id,
}

/// Pointer drag state
#[derive(Clone, Debug)]
pub struct DragTracker<Id> {
    dragging_id: Option<Id>,
    drop_target: Option<Id>,
    drag_just_ended: bool,
    /// Pending item id (pointer down but not yet dragging)
    pending_id: Option<Id>,
    /// Start position for movement detection
    start: (i32, i32),
    threshold: i32,
}

impl<Id: Copy + PartialEq> Default for DragTracker<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + PartialEq> DragTracker<Id> {
    pub fn new() -> Self {
        Self::with_threshold(DRAG_THRESHOLD_PX)
    }

    pub fn with_threshold(threshold: i32) -> Self {
        Self {
            dragging_id: None,
            drop_target: None,
            drag_just_ended: false,
            pending_id: None,
            start: (0, 0),
            threshold,
        }
    }

    pub fn dragging(&self) -> Option<Id> {
        self.dragging_id
    }

    pub fn drop_target(&self) -> Option<Id> {
        self.drop_target
    }

    /// Primary button pressed on a draggable item.
    /// Records a pending drag with its start position.
    pub fn pointer_down(&mut self, item_id: Id, x: i32, y: i32) {
        self.pending_id = Some(item_id);
        self.start = (x, y);
    }

    /// Pointer moved anywhere; starts the drag once it moved far enough
    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if self.pending_id.is_some() && self.dragging_id.is_none() {
            let dx = (x - self.start.0).abs();
            let dy = (y - self.start.1).abs();
            if dx > self.threshold || dy > self.threshold {
                self.dragging_id = self.pending_id;
            }
        }
    }

    /// Pointer entered an item while dragging
    pub fn pointer_enter(&mut self, item_id: Id) {
        if let Some(dragging) = self.dragging_id {
            // Don't allow dropping on self
            if dragging != item_id {
                self.drop_target = Some(item_id);
            }
        }
    }

    /// Pointer left the current drop target
    pub fn pointer_leave(&mut self) {
        if self.dragging_id.is_some() {
            self.drop_target = None;
        }
    }

    /// Pointer released. Returns the move if a real drag ended over a target.
    pub fn pointer_up(&mut self) -> Option<MoveEvent<Id>> {
        let dragged = self.dragging_id;
        let target = self.drop_target;
        self.end_drag();
        match (dragged, target) {
            (Some(moved), Some(target)) => Some(MoveEvent { moved, target }),
            _ => None,
        }
    }

    /// Abort any drag in progress without emitting a move
    pub fn cancel(&mut self) {
        self.dragging_id = None;
        self.drop_target = None;
        self.pending_id = None;
    }

    /// Returns true once after a real drag ended, so the click that
    /// follows the release can be swallowed.
    pub fn take_click_suppressed(&mut self) -> bool {
        std::mem::take(&mut self.drag_just_ended)
    }

    fn end_drag(&mut self) {
        self.drag_just_ended = self.dragging_id.is_some();
        self.dragging_id = None;
        self.drop_target = None;
        self.pending_id = None;
    }
}

/// Keyboard sorting: pick up, step the cursor, drop.
#[derive(Clone, Debug)]
pub struct KeyboardSort<Id> {
    picked: Option<Id>,
    cursor: usize,
}

impl<Id: Copy + PartialEq> Default for KeyboardSort<Id> {
    fn default() -> Self {
        Self { picked: None, cursor: 0 }
    }
}

impl<Id: Copy + PartialEq> KeyboardSort<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn picked(&self) -> Option<Id> {
        self.picked
    }

    /// Item currently under the cursor
    pub fn cursor_item(&self, order: &[Id]) -> Option<Id> {
        self.picked?;
        order.get(self.cursor).copied()
    }

    /// Pick up `item_id`; returns false if it is not in `order`
    pub fn pick_up(&mut self, item_id: Id, order: &[Id]) -> bool {
        match order.iter().position(|id| *id == item_id) {
            Some(index) => {
                self.picked = Some(item_id);
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    pub fn previous(&mut self) {
        if self.picked.is_some() {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    pub fn next(&mut self, order: &[Id]) {
        if self.picked.is_some() && self.cursor + 1 < order.len() {
            self.cursor += 1;
        }
    }

    /// Drop the picked item at the cursor
    pub fn drop_item(&mut self, order: &[Id]) -> Option<MoveEvent<Id>> {
        let moved = self.picked.take()?;
        let target = *order.get(self.cursor)?;
        if target == moved {
            return None;
        }
        Some(MoveEvent { moved, target })
    }

    pub fn cancel(&mut self) {
        self.picked = None;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_without_movement_is_not_a_drag() {
        let mut dnd = DragTracker::<u32>::new();
        dnd.pointer_down(1, 10, 10);
        dnd.pointer_move(12, 13);
        dnd.pointer_enter(2);

        assert_eq!(dnd.dragging(), None);
        assert_eq!(dnd.pointer_up(), None);
        assert!(!dnd.take_click_suppressed());
    }

    #[test]
    fn test_drag_over_target_emits_move() {
        let mut dnd = DragTracker::<u32>::new();
        dnd.pointer_down(4, 0, 0);
        dnd.pointer_move(0, 20);
        assert_eq!(dnd.dragging(), Some(4));

        dnd.pointer_enter(2);
        assert_eq!(dnd.pointer_up(), Some(MoveEvent { moved: 4, target: 2 }));
        assert!(dnd.take_click_suppressed());
        assert!(!dnd.take_click_suppressed());
        assert_eq!(dnd.dragging(), None);
    }

    #[test]
    fn test_cannot_drop_on_self() {
        let mut dnd = DragTracker::<u32>::new();
        dnd.pointer_down(3, 0, 0);
        dnd.pointer_move(30, 0);
        dnd.pointer_enter(3);

        assert_eq!(dnd.drop_target(), None);
        assert_eq!(dnd.pointer_up(), None);
    }

    #[test]
    fn test_leaving_target_clears_it() {
        let mut dnd = DragTracker::<u32>::new();
        dnd.pointer_down(1, 0, 0);
        dnd.pointer_move(0, 50);
        dnd.pointer_enter(2);
        dnd.pointer_leave();

        assert_eq!(dnd.pointer_up(), None);
    }

    #[test]
    fn test_keyboard_sort_moves_cursor_and_drops() {
        let order = [10u32, 20, 30, 40];
        let mut kb = KeyboardSort::new();
        assert!(kb.pick_up(40, &order));
        kb.previous();
        kb.previous();
        assert_eq!(kb.cursor_item(&order), Some(20));

        assert_eq!(kb.drop_item(&order), Some(MoveEvent { moved: 40, target: 20 }));
        assert_eq!(kb.picked(), None);
    }

    #[test]
    fn test_keyboard_sort_clamps_and_ignores_in_place_drop() {
        let order = [1u32, 2];
        let mut kb = KeyboardSort::new();
        assert!(!kb.pick_up(9, &order));

        assert!(kb.pick_up(2, &order));
        kb.next(&order);
        kb.next(&order);
        assert_eq!(kb.cursor_item(&order), Some(2));
        assert_eq!(kb.drop_item(&order), None);
    }
}
