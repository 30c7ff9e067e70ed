/// Linear snapshot timeline with a cursor and sliding-window capacity.
///
/// This is the bookkeeping core of the history manager. It never calls
/// user code: equality checks, duplication and change notification all
/// happen in `HistoryManager`, which hands already-duplicated entries in.
use std::rc::Rc;

/// Ordered snapshots (oldest first) plus the index of the current one.
#[derive(Debug)]
pub(crate) struct Timeline<T> {
    /// Stored duplicates, in chronological order.
    entries: Vec<Rc<T>>,
    /// Index of the current entry. `None` means "no current state".
    cursor: Option<usize>,
    /// Maximum number of retained entries. 0 = unbounded.
    capacity: usize,
}

impl<T> Timeline<T> {
    /// Creates an empty timeline with the given capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            capacity,
        }
    }

    pub(crate) fn current(&self) -> Option<&Rc<T>> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub(crate) fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub(crate) fn entries(&self) -> &[Rc<T>] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub(crate) fn can_redo(&self) -> bool {
        match self.cursor {
            Some(c) => c + 1 < self.entries.len(),
            None => !self.is_empty(),
        }
    }

    /// Appends `entry` after the cursor and makes it current.
    ///
    /// Everything past the cursor (the redo branch) is discarded first.
    /// Returns the number of entries evicted by the capacity trim.
    pub(crate) fn record(&mut self, entry: Rc<T>) -> usize {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        self.cursor = Some(keep);
        self.trim()
    }

    /// Moves the cursor one step back. Returns `(from, to)` if it moved.
    pub(crate) fn step_back(&mut self) -> Option<(Rc<T>, Rc<T>)> {
        let c = self.cursor.filter(|&c| c > 0)?;
        let from = Rc::clone(&self.entries[c]);
        let to = Rc::clone(&self.entries[c - 1]);
        self.cursor = Some(c - 1);
        Some((from, to))
    }

    /// Moves the cursor one step forward. Returns `(from, to)` if it moved.
    ///
    /// `from` is `None` when the cursor was clamped off the front by a
    /// capacity trim but entries remain ahead of it.
    pub(crate) fn step_forward(&mut self) -> Option<(Option<Rc<T>>, Rc<T>)> {
        if !self.can_redo() {
            return None;
        }
        let next = self.cursor.map_or(0, |c| c + 1);
        let from = self.current().cloned();
        let to = Rc::clone(&self.entries[next]);
        self.cursor = Some(next);
        Some((from, to))
    }

    /// Changes the capacity and trims immediately.
    pub(crate) fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity;
        self.trim()
    }

    /// Drops all entries. Returns the entry that was current.
    pub(crate) fn clear(&mut self) -> Option<Rc<T>> {
        let previous = self.current().cloned();
        self.entries.clear();
        self.cursor = None;
        previous
    }

    /// Evicts the oldest entries beyond capacity in one drain.
    ///
    /// The cursor shifts down by the evicted count and is clamped to
    /// `None` rather than snapped to the new front when the current
    /// entry itself was evicted.
    fn trim(&mut self) -> usize {
        if self.capacity == 0 || self.entries.len() <= self.capacity {
            return 0;
        }
        let overflow = self.entries.len() - self.capacity;
        self.entries.drain(..overflow);
        self.cursor = self.cursor.and_then(|c| c.checked_sub(overflow));
        overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, values: impl IntoIterator<Item = i32>) -> Timeline<i32> {
        let mut timeline = Timeline::new(capacity);
        for v in values {
            timeline.record(Rc::new(v));
        }
        timeline
    }

    fn values(timeline: &Timeline<i32>) -> Vec<i32> {
        timeline.entries().iter().map(|e| **e).collect()
    }

    #[test]
    fn test_empty_timeline() {
        let timeline: Timeline<i32> = Timeline::new(0);
        assert!(timeline.current().is_none());
        assert_eq!(timeline.cursor(), None);
        assert_eq!(timeline.len(), 0);
        assert!(timeline.is_empty());
        assert!(!timeline.can_undo());
        assert!(!timeline.can_redo());
    }

    #[test]
    fn test_record_advances_cursor() {
        let timeline = filled(0, [1, 2, 3]);
        assert_eq!(timeline.cursor(), Some(2));
        assert_eq!(timeline.current().map(|e| **e), Some(3));
        assert!(timeline.can_undo());
        assert!(!timeline.can_redo());
    }

    #[test]
    fn test_record_discards_redo_branch() {
        let mut timeline = filled(0, [1, 2, 3]);
        timeline.step_back();
        timeline.step_back();
        timeline.record(Rc::new(9));
        assert_eq!(values(&timeline), vec![1, 9]);
        assert!(!timeline.can_redo());
    }

    #[test]
    fn test_step_back_stops_at_first_entry() {
        let mut timeline = filled(0, [1, 2]);
        let (from, to) = timeline.step_back().expect("step back");
        assert_eq!((*from, *to), (2, 1));
        assert!(timeline.step_back().is_none());
        assert_eq!(timeline.cursor(), Some(0));
    }

    #[test]
    fn test_step_forward_stops_at_tip() {
        let mut timeline = filled(0, [1, 2]);
        timeline.step_back();
        let (from, to) = timeline.step_forward().expect("step forward");
        assert_eq!(from.map(|e| *e), Some(1));
        assert_eq!(*to, 2);
        assert!(timeline.step_forward().is_none());
    }

    #[test]
    fn test_trim_on_record_keeps_newest() {
        let timeline = filled(3, 1..=7);
        assert_eq!(values(&timeline), vec![5, 6, 7]);
        assert_eq!(timeline.cursor(), Some(2));
    }

    #[test]
    fn test_set_capacity_shifts_cursor() {
        let mut timeline = filled(0, 1..=5);
        let evicted = timeline.set_capacity(3);
        assert_eq!(evicted, 2);
        assert_eq!(values(&timeline), vec![3, 4, 5]);
        assert_eq!(timeline.cursor(), Some(2));
    }

    #[test]
    fn test_set_capacity_clamps_evicted_cursor() {
        let mut timeline = filled(0, 1..=5);
        timeline.step_back();
        timeline.step_back();
        timeline.step_back(); // cursor at value 2
        timeline.set_capacity(3);
        assert_eq!(values(&timeline), vec![3, 4, 5]);
        assert_eq!(timeline.cursor(), None);
        assert!(timeline.current().is_none());
        assert!(!timeline.can_undo());
        assert!(timeline.can_redo());
    }

    #[test]
    fn test_step_forward_from_clamped_cursor() {
        let mut timeline = filled(0, 1..=5);
        for _ in 0..4 {
            timeline.step_back();
        }
        timeline.set_capacity(2);
        let (from, to) = timeline.step_forward().expect("step forward");
        assert!(from.is_none());
        assert_eq!(*to, 4);
        assert_eq!(timeline.cursor(), Some(0));
    }

    #[test]
    fn test_record_from_clamped_cursor_replaces_everything() {
        let mut timeline = filled(0, 1..=4);
        for _ in 0..3 {
            timeline.step_back();
        }
        timeline.set_capacity(2);
        timeline.record(Rc::new(42));
        assert_eq!(values(&timeline), vec![42]);
        assert_eq!(timeline.cursor(), Some(0));
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut timeline = filled(0, 1..=100);
        assert_eq!(timeline.len(), 100);
        assert_eq!(timeline.set_capacity(0), 0);
        assert_eq!(timeline.len(), 100);
    }

    #[test]
    fn test_clear_returns_previous_current() {
        let mut timeline = filled(0, [1, 2]);
        assert_eq!(timeline.clear().map(|e| *e), Some(2));
        assert!(timeline.is_empty());
        assert_eq!(timeline.cursor(), None);
        assert!(timeline.clear().is_none());
    }

    #[test]
    fn test_capacity_accessor() {
        let mut timeline: Timeline<i32> = Timeline::new(4);
        assert_eq!(timeline.capacity(), 4);
        timeline.set_capacity(9);
        assert_eq!(timeline.capacity(), 9);
    }
}
