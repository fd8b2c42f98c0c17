//! Linear undo/redo over immutable snapshots.
//!
//! Snapshots are shared as `Arc<T>` and never mutated once stored. `set`
//! treats a pointer-identical value as "no change", so callers must hand in a
//! freshly allocated snapshot for every edit (see `RoutingEditor::update`).

use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct History<T> {
    /// Oldest first.
    past: Vec<Arc<T>>,
    present: Arc<T>,
    /// Nearest redo first.
    future: VecDeque<Arc<T>>,
}

impl<T> History<T> {
    pub fn new(initial: T) -> Self {
        Self::from_snapshot(Arc::new(initial))
    }

    pub fn from_snapshot(present: Arc<T>) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: VecDeque::new(),
        }
    }

    pub fn present(&self) -> &Arc<T> {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Commit `next` as the new present. Discards any redo entries.
    ///
    /// Returns `false` (and leaves history untouched) when `next` is the
    /// current snapshot itself.
    pub fn set(&mut self, next: Arc<T>) -> bool {
        if Arc::ptr_eq(&next, &self.present) {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push(previous);
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    /// Replace the whole state with a single snapshot and no history.
    pub fn reset(&mut self, next: Arc<T>) {
        self.past.clear();
        self.future.clear();
        self.present = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_edit_after_undo_drops_redo() {
        let mut h = History::new("initial");
        let a = Arc::new("a");
        let b = Arc::new("b");
        let c = Arc::new("c");
        h.set(a.clone());
        h.set(b);
        assert!(h.undo());
        assert!(Arc::ptr_eq(h.present(), &a));
        assert!(h.can_redo());
        h.set(c.clone());
        assert!(!h.can_redo());
        assert_eq!(h.future_len(), 0);
        assert!(Arc::ptr_eq(h.present(), &c));
        assert_eq!(h.past_len(), 2);
    }

    #[test]
    fn setting_the_present_snapshot_is_a_no_op() {
        let mut h = History::new(1);
        let same = h.present().clone();
        assert!(!h.set(same));
        assert!(!h.can_undo());
        // Equal value, distinct allocation: recorded.
        assert!(h.set(Arc::new(1)));
        assert!(h.can_undo());
    }

    #[test]
    fn undo_redo_on_empty_stacks() {
        let mut h = History::new(0);
        assert!(!h.undo());
        assert!(!h.redo());
        assert_eq!(**h.present(), 0);
    }

    #[test]
    fn redo_walks_forward_in_order() {
        let mut h = History::new(0);
        for i in 1..=3 {
            h.set(Arc::new(i));
        }
        h.undo();
        h.undo();
        h.undo();
        assert_eq!(**h.present(), 0);
        let mut seen = Vec::new();
        while h.redo() {
            seen.push(**h.present());
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn reset_discards_everything() {
        let mut h = History::new(0);
        h.set(Arc::new(1));
        h.set(Arc::new(2));
        h.undo();
        h.reset(Arc::new(9));
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(**h.present(), 9);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Set,
        Undo,
        Redo,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Set), Just(Op::Undo), Just(Op::Redo)]
    }

    proptest! {
        #[test]
        fn snapshots_are_conserved(ops in proptest::collection::vec(op(), 0..64)) {
            let mut h = History::new(0usize);
            let mut sets = 0usize;
            for o in ops {
                match o {
                    Op::Set => {
                        sets += 1;
                        h.set(Arc::new(sets));
                        prop_assert_eq!(h.future_len(), 0);
                    }
                    Op::Undo => { h.undo(); }
                    Op::Redo => { h.redo(); }
                }
            }
            // Never holds more snapshots than were ever committed.
            prop_assert!(h.past_len() + 1 + h.future_len() <= sets + 1);
        }

        #[test]
        fn undo_then_redo_restores_identity(n in 1usize..16) {
            let mut h = History::new(0usize);
            for i in 1..=n {
                h.set(Arc::new(i));
            }
            let before = h.present().clone();
            prop_assert!(h.undo());
            prop_assert!(h.redo());
            prop_assert!(Arc::ptr_eq(h.present(), &before));
        }
    }
}
