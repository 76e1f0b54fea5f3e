//! Bounded undo/redo of reversible actions
//!
//! [`HistoryManager`] is generic over the action type and knows nothing
//! about geometry. Actions are typed records implementing [`Reversible`];
//! they apply their inverse to a target passed in at undo/redo time rather
//! than capturing live references.
//!
//! While grouping, pushed actions are buffered and land as one composite
//! entry on [`end_group`](HistoryManager::end_group): its undo runs the
//! buffered undos in reverse, its redo replays them in order.

mod events;

use std::collections::VecDeque;

use tracing::debug;
use vektor_config::DEFAULT_HISTORY_LIMIT;

pub use events::HistoryEvent;

/// An operation with an exact inverse
pub trait Reversible {
    /// What the action mutates
    type Target;

    fn undo(&self, target: &mut Self::Target);
    fn redo(&self, target: &mut Self::Target);
    fn label(&self) -> &str;
}

/// One undo stack entry
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry<A> {
    Single(A),
    Group { label: String, items: Vec<A> },
}

impl<A: Reversible> HistoryEntry<A> {
    pub fn label(&self) -> &str {
        match self {
            HistoryEntry::Single(action) => action.label(),
            HistoryEntry::Group { label, .. } => label,
        }
    }

    fn undo(&self, target: &mut A::Target) {
        match self {
            HistoryEntry::Single(action) => action.undo(target),
            HistoryEntry::Group { items, .. } => {
                for action in items.iter().rev() {
                    action.undo(target);
                }
            }
        }
    }

    fn redo(&self, target: &mut A::Target) {
        match self {
            HistoryEntry::Single(action) => action.redo(target),
            HistoryEntry::Group { items, .. } => {
                for action in items {
                    action.redo(target);
                }
            }
        }
    }
}

type Listener = Box<dyn Fn(HistoryEvent) + Send + Sync>;

/// Undo/redo stacks with FIFO eviction beyond `limit`
pub struct HistoryManager<A> {
    /// Oldest at the front
    undo_stack: VecDeque<HistoryEntry<A>>,
    redo_stack: Vec<HistoryEntry<A>>,
    grouping: Option<Vec<A>>,
    limit: usize,
    listeners: Vec<Listener>,
}

impl<A> std::fmt::Debug for HistoryManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_len", &self.undo_stack.len())
            .field("redo_len", &self.redo_stack.len())
            .field("grouping", &self.grouping.as_ref().map(Vec::len))
            .field("limit", &self.limit)
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl<A: Reversible> Default for HistoryManager<A> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<A: Reversible> HistoryManager<A> {
    /// A limit of 0 is treated as 1
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            grouping: None,
            limit: limit.max(1),
            listeners: Vec::new(),
        }
    }

    /// Register a listener called on every successful mutation
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(HistoryEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit, evicting the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.enforce_limit();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_grouping(&self) -> bool {
        self.grouping.is_some()
    }

    /// Label of the entry `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(HistoryEntry::label)
    }

    /// Label of the entry `redo` would replay
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(HistoryEntry::label)
    }

    /// Start buffering pushes. No-op if already grouping.
    pub fn begin_group(&mut self) {
        if self.grouping.is_none() {
            self.grouping = Some(Vec::new());
        }
    }

    /// Close the group as one entry. An empty group is discarded.
    pub fn end_group(&mut self, label: impl Into<String>) {
        let Some(items) = self.grouping.take() else {
            return;
        };
        if items.is_empty() {
            debug!("HistoryManager::end_group: empty group discarded");
            return;
        }
        let label = label.into();
        let size = items.len();
        self.redo_stack.clear();
        self.undo_stack.push_back(HistoryEntry::Group {
            label: label.clone(),
            items,
        });
        self.enforce_limit();
        self.emit(HistoryEvent::GroupEnded { label, size });
    }

    /// Record an already-applied action. Inside a group it is buffered.
    pub fn push(&mut self, action: A) {
        if let Some(group) = self.grouping.as_mut() {
            group.push(action);
            return;
        }
        let label = action.label().to_string();
        self.redo_stack.clear();
        self.undo_stack.push_back(HistoryEntry::Single(action));
        self.enforce_limit();
        self.emit(HistoryEvent::Pushed { label });
    }

    /// Revert the newest entry. Returns false if there is nothing to undo.
    pub fn undo(&mut self, target: &mut A::Target) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        entry.undo(target);
        let label = entry.label().to_string();
        self.redo_stack.push(entry);
        debug!("HistoryManager::undo: {}", label);
        self.emit(HistoryEvent::Undone { label });
        true
    }

    /// Replay the newest undone entry. Returns false if there is nothing
    /// to redo.
    pub fn redo(&mut self, target: &mut A::Target) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        entry.redo(target);
        let label = entry.label().to_string();
        self.undo_stack.push_back(entry);
        self.enforce_limit();
        debug!("HistoryManager::redo: {}", label);
        self.emit(HistoryEvent::Redone { label });
        true
    }

    /// Drop both stacks and any open group
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.grouping = None;
        self.emit(HistoryEvent::Cleared);
    }

    fn enforce_limit(&mut self) {
        let excess = self.undo_stack.len().saturating_sub(self.limit);
        if excess > 0 {
            self.undo_stack.drain(..excess);
            debug!("HistoryManager: evicted {} oldest entries", excess);
            self.emit(HistoryEvent::Evicted { count: excess });
        }
    }

    fn emit(&self, event: HistoryEvent) {
        for listener in &self.listeners {
            listener(event.clone());
        }
    }
}
