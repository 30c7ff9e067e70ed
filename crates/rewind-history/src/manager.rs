/// Snapshot-based undo/redo manager.
///
/// The manager owns a linear timeline of duplicated snapshots and a cursor
/// into it. Pushes inside a transaction collapse into one entry, pushes
/// while paused or while the change callback runs are dropped, and every
/// move of the cursor is reported through the change callback.
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::config::HistoryConfig;
use crate::hooks::{ChangeFn, CompareFn, DuplicateFn};
use crate::options::{HistoryOptions, PushOptions};
use crate::timeline::Timeline;

/// Undo/redo history over application-defined snapshots.
///
/// All operations take `&self`, so the manager can be shared through an
/// `Rc` with the change callback and with transaction bodies. The type is
/// not `Sync`: a multi-threaded host should keep it on one owner thread and
/// send it requests.
///
/// User hooks are never called while internal state is borrowed, so a
/// callback may read from or write to the manager it is attached to.
/// Pushes made while the change callback runs are ignored.
pub struct HistoryManager<T> {
    timeline: RefCell<Timeline<T>>,
    compare: Box<CompareFn<T>>,
    duplicate: Box<DuplicateFn<T>>,
    on_change: RefCell<Option<Rc<ChangeFn<T>>>>,
    /// Whether pushes are accepted (toggled by pause/resume).
    recording: Cell<bool>,
    /// Set while the change callback runs.
    dispatching: Cell<bool>,
    /// Number of open transactions.
    depth: Cell<usize>,
    /// Last state pushed inside the open transaction, already duplicated.
    pending: RefCell<Option<T>>,
}

impl<T> std::fmt::Debug for HistoryManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timeline = self.timeline.borrow();
        f.debug_struct("HistoryManager")
            .field("len", &timeline.len())
            .field("index", &timeline.cursor())
            .field("capacity", &timeline.capacity())
            .field("recording", &self.recording.get())
            .field("dispatching", &self.dispatching.get())
            .field("depth", &self.depth.get())
            .field("pending", &self.pending.borrow().is_some())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> HistoryManager<T> {
    /// Creates an empty, unbounded manager using `PartialEq` and `Clone`.
    ///
    /// These defaults suit plain data. A snapshot holding handles, shared
    /// pointers or interior mutability needs a `duplicate` hook that makes a
    /// truly independent copy; see `HistoryOptions`.
    pub fn new() -> Self {
        Self::with_options(HistoryOptions::default())
    }

    /// Creates an empty manager with defaults and the configured capacity.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::with_options(HistoryOptions::from_config(config))
    }
}

impl<T: Clone + PartialEq + 'static> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryManager<T> {
    /// Creates an empty manager from explicit options.
    pub fn with_options(options: HistoryOptions<T>) -> Self {
        Self {
            timeline: RefCell::new(Timeline::new(options.capacity)),
            compare: options.compare,
            duplicate: options.duplicate,
            on_change: RefCell::new(options.on_change),
            recording: Cell::new(true),
            dispatching: Cell::new(false),
            depth: Cell::new(0),
            pending: RefCell::new(None),
        }
    }

    /// Replaces the change callback.
    pub fn set_on_change(&self, on_change: impl Fn(Option<&T>, Option<&T>) + 'static) {
        let callback: Rc<ChangeFn<T>> = Rc::new(on_change);
        *self.on_change.borrow_mut() = Some(callback);
    }

    /// Removes the change callback.
    pub fn remove_on_change(&self) {
        self.on_change.borrow_mut().take();
    }

    /// Records `state` as the new current snapshot and notifies.
    ///
    /// See [`push_state_with`](Self::push_state_with).
    pub fn push_state(&self, state: &T) {
        self.push_state_with(state, PushOptions::default());
    }

    /// Records `state` as the new current snapshot.
    ///
    /// Does nothing while paused, while the change callback runs, or when
    /// `state` equals the current snapshot. Inside a transaction the state
    /// is only staged; the last staged state is recorded when the outermost
    /// transaction ends. Otherwise the redo branch is discarded, a duplicate
    /// of `state` is appended and the capacity is enforced. The change
    /// callback fires unless `options.silent` is set.
    pub fn push_state_with(&self, state: &T, options: PushOptions) {
        if !self.accepts_push() {
            return;
        }

        if self.in_transaction() {
            let staged = (self.duplicate)(state);
            self.pending.replace(Some(staged));
            tracing::trace!("Staged snapshot in transaction (depth {})", self.depth.get());
            return;
        }

        if self.is_current(state) {
            tracing::trace!("Push skipped: state equals current snapshot");
            return;
        }

        let entry = Rc::new((self.duplicate)(state));
        self.append(entry, options);
    }

    /// Moves one step back in history. Returns whether the cursor moved.
    pub fn undo(&self) -> bool {
        let step = self.timeline.borrow_mut().step_back();
        let Some((from, to)) = step else {
            return false;
        };
        tracing::debug!("Undo to index {:?}", self.index());
        self.notify(Some(&*from), Some(&*to));
        true
    }

    /// Moves one step forward in history. Returns whether the cursor moved.
    pub fn redo(&self) -> bool {
        let step = self.timeline.borrow_mut().step_forward();
        let Some((from, to)) = step else {
            return false;
        };
        tracing::debug!("Redo to index {:?}", self.index());
        self.notify(from.as_deref(), Some(&*to));
        true
    }

    /// The current snapshot, if any.
    ///
    /// This is the stored duplicate itself, not a fresh copy.
    pub fn current(&self) -> Option<Rc<T>> {
        self.timeline.borrow().current().cloned()
    }

    /// Index of the current snapshot. `None` when there is no current state.
    pub fn index(&self) -> Option<usize> {
        self.timeline.borrow().cursor()
    }

    /// All retained snapshots, oldest first.
    ///
    /// The returned vector is a copy of the pointers; the snapshots are
    /// shared with the manager.
    pub fn states(&self) -> Vec<Rc<T>> {
        self.timeline.borrow().entries().to_vec()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.timeline.borrow().len()
    }

    /// Whether no snapshots are retained.
    pub fn is_empty(&self) -> bool {
        self.timeline.borrow().is_empty()
    }

    /// Whether an earlier snapshot exists.
    pub fn can_undo(&self) -> bool {
        self.timeline.borrow().can_undo()
    }

    /// Whether a later snapshot exists.
    pub fn can_redo(&self) -> bool {
        self.timeline.borrow().can_redo()
    }

    /// Current capacity. 0 = unbounded.
    pub fn capacity(&self) -> usize {
        self.timeline.borrow().capacity()
    }

    /// Changes the capacity and evicts the oldest snapshots beyond it.
    ///
    /// Never notifies, even when the current snapshot is evicted.
    pub fn set_capacity(&self, capacity: usize) {
        let evicted = self.timeline.borrow_mut().set_capacity(capacity);
        if evicted > 0 {
            tracing::debug!("Capacity set to {capacity}, evicted {evicted} snapshots");
        }
    }

    /// Stops accepting pushes. Pushes made while paused are dropped.
    pub fn pause(&self) {
        self.recording.set(false);
    }

    /// Accepts pushes again.
    pub fn resume(&self) {
        self.recording.set(true);
    }

    /// Whether pushes are currently accepted.
    pub fn is_recording(&self) -> bool {
        self.recording.get()
    }

    /// Drops all history. Always notifies, even when already empty.
    pub fn clear(&self) {
        let previous = self.timeline.borrow_mut().clear();
        tracing::debug!("History cleared");
        self.notify(previous.as_deref(), None);
    }

    /// Runs `body` as one transaction.
    ///
    /// Pushes made inside `body` (including nested transactions) collapse
    /// into the last one, recorded when the outermost transaction ends.
    /// The staged state is recorded even when `body` panics or returns an
    /// `Err`; the panic is resumed and the value is returned unchanged.
    pub fn transaction<R>(&self, body: impl FnOnce() -> R) -> R {
        self.depth.set(self.depth.get() + 1);
        let outcome = panic::catch_unwind(AssertUnwindSafe(body));
        self.end_transaction();
        match outcome {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Number of open transactions.
    pub fn transaction_depth(&self) -> usize {
        self.depth.get()
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.depth.get() > 0
    }

    fn accepts_push(&self) -> bool {
        if !self.recording.get() {
            tracing::trace!("Push skipped: recording paused");
            return false;
        }
        if self.dispatching.get() {
            tracing::trace!("Push skipped: change callback running");
            return false;
        }
        true
    }

    fn is_current(&self, state: &T) -> bool {
        let current = self.timeline.borrow().current().cloned();
        current.is_some_and(|current| (self.compare)(&*current, state))
    }

    fn end_transaction(&self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        if depth > 0 {
            return;
        }

        let staged = self.pending.borrow_mut().take();
        if let Some(staged) = staged {
            tracing::debug!("Committing transaction");
            self.commit(staged);
        }
    }

    /// Records an already-duplicated state through the ordinary push checks.
    fn commit(&self, staged: T) {
        if !self.accepts_push() || self.is_current(&staged) {
            return;
        }
        self.append(Rc::new(staged), PushOptions::default());
    }

    fn append(&self, entry: Rc<T>, options: PushOptions) {
        let (from, evicted, len) = {
            let mut timeline = self.timeline.borrow_mut();
            let from = timeline.current().cloned();
            let evicted = timeline.record(Rc::clone(&entry));
            (from, evicted, timeline.len())
        };
        tracing::debug!("Pushed snapshot ({len} retained, {evicted} evicted)");

        if !options.silent {
            self.notify(from.as_deref(), Some(&*entry));
        }
    }

    fn notify(&self, from: Option<&T>, to: Option<&T>) {
        let callback = self.on_change.borrow().clone();
        let Some(callback) = callback else {
            return;
        };
        let _guard = DispatchGuard::engage(&self.dispatching);
        callback(from, to);
    }
}

/// Marks the change callback as running until dropped.
///
/// Restores the previous value, so a nested dispatch (an undo issued from
/// inside the callback) does not clear the outer one's flag.
struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> DispatchGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
