//! Scope-indexed stacks

/// Slot sizes captured at scope entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame(Vec<usize>);

/// A fixed set of stacks ("slots") that are truncated back together when a
/// lexical scope ends.
///
/// Only the top of each slot is active. Restoring a [`ScopeFrame`] drops every
/// item pushed since the frame was taken, in any slot.
#[derive(Debug)]
pub struct ScopedSlots<T> {
    slots: Vec<Vec<T>>,
}

impl<T> ScopedSlots<T> {
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| Vec::new()).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Push onto `slot`, growing the slot set if needed.
    pub fn push(&mut self, slot: usize, item: T) {
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, Vec::new);
        }
        self.slots[slot].push(item);
    }

    pub fn top(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)?.last()
    }

    pub fn top_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)?.last_mut()
    }

    pub fn depth(&self, slot: usize) -> usize {
        self.slots.get(slot).map_or(0, Vec::len)
    }

    pub fn frame(&self) -> ScopeFrame {
        ScopeFrame(self.slots.iter().map(Vec::len).collect())
    }

    /// Truncate every slot to its size in `frame`. Slots created after the
    /// frame was taken are emptied.
    pub fn restore(&mut self, frame: &ScopeFrame) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.truncate(frame.0.get(i).copied().unwrap_or(0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_of_each_slot() {
        let mut slots = ScopedSlots::new(2);
        assert_eq!(slots.top(0), None);
        slots.push(0, "a");
        slots.push(0, "b");
        slots.push(1, "x");
        assert_eq!(slots.top(0), Some(&"b"));
        assert_eq!(slots.top(1), Some(&"x"));
        assert_eq!(slots.top(7), None);
    }

    #[test]
    fn test_restore_truncates_all_slots() {
        let mut slots = ScopedSlots::new(3);
        slots.push(1, 1);
        let outer = slots.frame();

        slots.push(0, 2);
        slots.push(1, 3);
        let inner = slots.frame();
        slots.push(2, 4);
        slots.push(1, 5);

        slots.restore(&inner);
        assert_eq!(slots.top(1), Some(&3));
        assert_eq!(slots.top(2), None);

        slots.restore(&outer);
        assert_eq!(slots.top(0), None);
        assert_eq!(slots.top(1), Some(&1));
        assert_eq!(slots.depth(1), 1);
    }

    #[test]
    fn test_restore_empties_slots_grown_later() {
        let mut slots = ScopedSlots::new(1);
        let frame = slots.frame();
        slots.push(4, 'z');
        assert_eq!(slots.slot_count(), 5);
        slots.restore(&frame);
        assert_eq!(slots.top(4), None);
    }

    #[test]
    fn test_top_mut() {
        let mut slots = ScopedSlots::new(1);
        slots.push(0, 1);
        if let Some(top) = slots.top_mut(0) {
            *top += 1;
        }
        assert_eq!(slots.top(0), Some(&2));
    }
}
