/// Construction and push options.
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::HistoryConfig;
use crate::hooks::{self, ChangeFn, CompareFn, DuplicateFn};

/// Options for a single `push_state_with` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Record the state without firing the change callback.
    pub silent: bool,
}

impl PushOptions {
    /// Options for a push that does not notify.
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// Builder for a `HistoryManager`.
///
/// ```
/// use rewind_history::{HistoryManager, HistoryOptions};
///
/// let history = HistoryManager::with_options(
///     HistoryOptions::<String>::default()
///         .capacity(50)
///         .compare(|a, b| a.trim() == b.trim()),
/// );
/// history.push_state(&"draft".to_string());
/// assert_eq!(history.len(), 1);
/// ```
pub struct HistoryOptions<T> {
    pub(crate) capacity: usize,
    pub(crate) compare: Box<CompareFn<T>>,
    pub(crate) duplicate: Box<DuplicateFn<T>>,
    pub(crate) on_change: Option<Rc<ChangeFn<T>>>,
}

impl<T: Clone + PartialEq + 'static> Default for HistoryOptions<T> {
    fn default() -> Self {
        Self::with_hooks(hooks::structural_eq::<T>, hooks::deep_clone::<T>)
    }
}

impl<T: Clone + PartialEq + 'static> HistoryOptions<T> {
    /// Structural defaults with the capacity taken from `config`.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::default().capacity(config.capacity)
    }
}

impl<T: Serialize + DeserializeOwned + Clone + 'static> HistoryOptions<T> {
    /// Options that compare and duplicate snapshots through JSON.
    ///
    /// Useful for snapshot types that are serializable but do not
    /// implement `PartialEq`.
    pub fn json() -> Self {
        Self::with_hooks(hooks::json_eq::<T>, hooks::json_clone::<T>)
    }
}

impl<T> HistoryOptions<T> {
    /// Unbounded options with explicit hooks and no change callback.
    pub fn with_hooks(
        compare: impl Fn(&T, &T) -> bool + 'static,
        duplicate: impl Fn(&T) -> T + 'static,
    ) -> Self {
        Self {
            capacity: 0,
            compare: Box::new(compare),
            duplicate: Box::new(duplicate),
            on_change: None,
        }
    }

    /// Max number of retained snapshots. 0 = unbounded.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replaces the equality hook.
    pub fn compare(mut self, compare: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.compare = Box::new(compare);
        self
    }

    /// Replaces the duplication hook.
    pub fn duplicate(mut self, duplicate: impl Fn(&T) -> T + 'static) -> Self {
        self.duplicate = Box::new(duplicate);
        self
    }

    /// Sets the change callback, called with `(from, to)`.
    pub fn on_change(mut self, on_change: impl Fn(Option<&T>, Option<&T>) + 'static) -> Self {
        let callback: Rc<ChangeFn<T>> = Rc::new(on_change);
        self.on_change = Some(callback);
        self
    }
}

impl<T> std::fmt::Debug for HistoryOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryOptions")
            .field("capacity", &self.capacity)
            .field("on_change", &self.on_change.is_some())
            .finish_non_exhaustive()
    }
}
