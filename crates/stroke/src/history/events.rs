//! Events emitted on every successful history mutation.

/// Change notification for undo/redo UI state.
///
/// Listeners receive a clone of each event; they must not assume any
/// particular ordering relative to other listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// An action (or a finished group) landed on the undo stack
    Pushed { label: String },
    /// A group was closed with `size` actions
    GroupEnded { label: String, size: usize },
    Undone { label: String },
    Redone { label: String },
    /// The oldest undo entries were dropped to honor the limit
    Evicted { count: usize },
    Cleared,
}
