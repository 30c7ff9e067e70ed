/// Generic in-memory undo/redo history over state snapshots.
///
/// Provides a `HistoryManager` that keeps a bounded, linear timeline of
/// duplicated snapshots with a cursor into it, change notifications, and
/// transactions that collapse many pushes into one history entry.
pub mod config;
pub mod hooks;
pub mod manager;
pub mod options;
mod timeline;

pub use config::HistoryConfig;
pub use manager::HistoryManager;
pub use options::{HistoryOptions, PushOptions};
