//! Undo/redo over whole-document snapshots.
//!
//! Each entry is a by-value copy of the records and the selection taken just
//! before a mutation. Entries are never edited once pushed.

use std::collections::VecDeque;

use crate::record::Record;

pub const MAX_UNDO_LEVELS: usize = 50;

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub selection: Option<usize>,
    pub description: String,
}

impl Snapshot {
    pub fn new(records: &[Record], selection: Option<usize>, description: impl Into<String>) -> Self {
        Snapshot {
            records: records.to_vec(),
            selection,
            description: description.into(),
        }
    }

    // Labels are for status reporting and take no part in equality
    fn same_state(&self, records: &[Record], selection: Option<usize>) -> bool {
        self.selection == selection && self.records == records
    }
}

pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        History::new(MAX_UNDO_LEVELS)
    }
}

impl History {
    pub fn new(max_history: usize) -> Self {
        History {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history: max_history.max(1),
        }
    }

    /// Records the state about to be mutated. Returns false when the state is
    /// identical to the current undo top and nothing was pushed.
    pub fn push_undo(
        &mut self,
        records: &[Record],
        selection: Option<usize>,
        description: &str,
    ) -> bool {
        if let Some(top) = self.undo_stack.back() {
            if top.same_state(records, selection) {
                tracing::trace!(description, "skipping duplicate undo snapshot");
                return false;
            }
        }

        push_bounded(
            &mut self.undo_stack,
            Snapshot::new(records, selection, description),
            self.max_history,
        );
        self.redo_stack.clear();
        tracing::debug!(
            description,
            depth = self.undo_stack.len(),
            "pushed undo snapshot"
        );
        true
    }

    /// Pops the most recent snapshot, parking the current state on the redo
    /// stack. `None` when there is nothing to undo.
    pub fn undo(&mut self, records: &[Record], selection: Option<usize>) -> Option<Snapshot> {
        let restored = self.undo_stack.pop_back()?;
        push_bounded(
            &mut self.redo_stack,
            Snapshot::new(records, selection, restored.description.clone()),
            self.max_history,
        );
        Some(restored)
    }

    /// Mirror of `undo`. Does not clear the redo stack.
    pub fn redo(&mut self, records: &[Record], selection: Option<usize>) -> Option<Snapshot> {
        let restored = self.redo_stack.pop_back()?;
        push_bounded(
            &mut self.undo_stack,
            Snapshot::new(records, selection, restored.description.clone()),
            self.max_history,
        );
        Some(restored)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Entry the next undo would restore.
    pub fn peek_undo(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.undo_stack.iter()
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, max: usize) {
    stack.push_back(snapshot);
    while stack.len() > max {
        stack.pop_front();
    }
}
