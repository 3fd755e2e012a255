//! The editing session: one open document plus everything that has to stay
//! consistent with it.
//!
//! The front end never touches the record store, history or dirty flags
//! directly. It forwards pane keystrokes with [`Session::set_pending_field_value`]
//! and calls the operation methods; each of them flushes pending pane text
//! into the store first, snapshots for undo, mutates, then rebuilds the
//! duplicate index before returning. Operations that need an answer from
//! the user take a [`Prompter`].

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::duplicates::DuplicateIndex;
use crate::error::{EditorError, Result};
use crate::history::History;
use crate::jsonl;
use crate::prompt::{Choice, Prompter};
use crate::record::{FieldKey, Record};
use crate::store::RecordStore;

pub const UNTITLED_FILE_NAME: &str = "Untitled.jsonl";

/// One line of the record list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRow {
    pub index: usize,
    pub preview: String,
    pub is_duplicate: bool,
}

impl DisplayRow {
    pub fn label(&self) -> String {
        format!("Item {}: {}", self.index + 1, self.preview)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusSummary {
    pub file_label: String,
    pub dirty_marker: &'static str,
    pub message: String,
}

pub struct Session {
    store: RecordStore,
    history: History,
    duplicates: DuplicateIndex,
    // Text of the three panes as last reported by the front end
    pending: [String; 3],
    field_dirty: bool,
    file_dirty: bool,
    file_path: Option<PathBuf>,
    autosave_on_blur: bool,
    message: String,
    // Bumped whenever `pending` is reloaded from the store
    revision: u64,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            store: RecordStore::new(),
            history: History::default(),
            duplicates: DuplicateIndex::default(),
            pending: Default::default(),
            field_dirty: false,
            file_dirty: false,
            file_path: None,
            autosave_on_blur: true,
            message: "Ready".to_string(),
            revision: 0,
        }
    }

    // ---- queries ----

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn selection(&self) -> Option<usize> {
        self.store.selection()
    }

    pub fn has_selection(&self) -> bool {
        self.store.selected().is_some()
    }

    pub fn duplicates(&self) -> &DuplicateIndex {
        &self.duplicates
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_field_dirty(&self) -> bool {
        self.field_dirty
    }

    pub fn is_file_dirty(&self) -> bool {
        self.file_dirty
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn autosave_on_blur(&self) -> bool {
        self.autosave_on_blur
    }

    pub fn set_autosave_on_blur(&mut self, enabled: bool) {
        self.autosave_on_blur = enabled;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_save(&self) -> bool {
        self.file_path.is_some() && self.file_dirty
    }

    pub fn can_save_as(&self) -> bool {
        !self.store.is_empty() || self.file_path.is_some()
    }

    pub fn can_delete(&self) -> bool {
        self.has_selection()
    }

    pub fn get_display_rows(&self) -> Vec<DisplayRow> {
        self.store
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| DisplayRow {
                index,
                preview: record.preview(),
                is_duplicate: self.duplicates.contains(index),
            })
            .collect()
    }

    /// Stored values of the record at `index`, in instruction/input/output
    /// order.
    pub fn get_field_values(&self, index: usize) -> Result<[String; 3]> {
        Ok(self.store.get(index)?.fields())
    }

    /// Pane text the front end should currently display.
    pub fn pending_field(&self, key: FieldKey) -> &str {
        &self.pending[key.index()]
    }

    pub fn file_label(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED_FILE_NAME.to_string())
    }

    pub fn get_status_summary(&self) -> StatusSummary {
        StatusSummary {
            file_label: self.file_label(),
            dirty_marker: if self.file_dirty { "*" } else { "" },
            message: self.message.clone(),
        }
    }

    // ---- pane edits ----

    /// Mirrors one pane's full text. Ignored while no record is selected.
    pub fn set_pending_field_value(&mut self, key: FieldKey, text: &str) -> bool {
        let Some(index) = self.valid_selection() else {
            return false;
        };
        self.pending[key.index()] = text.to_string();
        self.field_dirty = true;
        self.file_dirty = true;
        self.message = format!("Editing Item {}. Changes not saved.", index + 1);
        true
    }

    /// Flushes pane text into the selected record. Returns whether any
    /// stored field changed.
    pub fn commit_pending_edits(&mut self) -> bool {
        if !self.field_dirty {
            return false;
        }
        let Some(index) = self.valid_selection() else {
            self.field_dirty = false;
            return false;
        };

        match self.apply_pending(index) {
            Ok(changed) => {
                self.field_dirty = false;
                changed
            }
            Err(err) => {
                tracing::error!(%err, "commit against an invalid selection");
                self.field_dirty = false;
                false
            }
        }
    }

    fn apply_pending(&mut self, index: usize) -> Result<bool> {
        // Snapshot first; an identical top is coalesced by the history
        let description = format!("Edit Item {}", index + 1);
        self.history
            .push_undo(self.store.records(), self.store.selection(), &description);

        let updated: Vec<(FieldKey, String)> = {
            let record = self.store.get(index)?;
            FieldKey::ALL
                .iter()
                .map(|key| (*key, self.pending[key.index()].trim().to_string()))
                .filter(|(key, value)| record.field(*key) != value.as_str())
                .collect()
        };
        if updated.is_empty() {
            return Ok(false);
        }

        let record = self.store.get_mut(index)?;
        for (key, value) in &updated {
            record.set_field(*key, value);
        }
        self.duplicates = DuplicateIndex::recompute(self.store.records());
        self.file_dirty = true;
        tracing::debug!(index, fields = updated.len(), "committed pane edits");
        Ok(true)
    }

    /// Focus left a pane: commit, then write through when a path is bound.
    pub fn focus_lost(&mut self, prompter: &mut dyn Prompter) {
        self.commit_pending_edits();
        if !(self.file_dirty && self.autosave_on_blur) {
            return;
        }
        if let Some(path) = self.file_path.clone() {
            if let Err(err) = self.write_records(&path, true) {
                self.report(prompter, "Autosave Error", &err);
            }
        }
    }

    // ---- selection ----

    pub fn select_index(&mut self, index: usize) -> bool {
        self.commit_pending_edits();
        if index >= self.store.len() {
            return false;
        }
        if self.store.selection() == Some(index) {
            return true;
        }
        if self.store.select(Some(index)).is_err() {
            return false;
        }
        self.reload_pending();
        self.message = format!("Displaying Item {} of {}", index + 1, self.store.len());
        true
    }

    // ---- structural operations ----

    pub fn add_record_after_selection(&mut self) {
        self.commit_pending_edits();
        self.history
            .push_undo(self.store.records(), self.store.selection(), "Add Item");

        let at = self
            .valid_selection()
            .map(|i| i + 1)
            .unwrap_or_else(|| self.store.len());
        if let Err(err) = self.store.insert(at, Record::template()) {
            tracing::error!(%err, "insert position out of range");
            return;
        }
        self.after_structural_change();
        self.message = format!("Added new item. Now {} items.", self.store.len());
    }

    /// Deletes the selected record after confirmation.
    pub fn delete_selected(&mut self, prompter: &mut dyn Prompter) -> bool {
        let Some(index) = self.valid_selection() else {
            prompter.report_error("Delete Item", "No item selected or selection is invalid.");
            return false;
        };
        let question = format!("Are you sure you want to delete Item {}?", index + 1);
        if !prompter.prompt_yes_no("Confirm Delete", &question) {
            self.message = "Delete cancelled.".to_string();
            return false;
        }

        self.commit_pending_edits();
        self.history.push_undo(
            self.store.records(),
            self.store.selection(),
            &format!("Delete Item {}", index + 1),
        );
        if let Err(err) = self.store.remove_at(index) {
            tracing::error!(%err, "delete position out of range");
            return false;
        }
        self.after_structural_change();
        self.message = match self.store.selection() {
            Some(sel) => format!(
                "Displaying Item {} of {}. Previous item deleted.",
                sel + 1,
                self.store.len()
            ),
            None => "Deleted item. List is now empty.".to_string(),
        };
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            self.message = "Nothing to undo.".to_string();
            return false;
        }
        self.commit_pending_edits();
        let Some(snapshot) = self
            .history
            .undo(self.store.records(), self.store.selection())
        else {
            return false;
        };
        self.restore(snapshot.records, snapshot.selection);
        self.message = format!("Undo: {}. File has unsaved changes.", snapshot.description);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.commit_pending_edits();
        let Some(snapshot) = self
            .history
            .redo(self.store.records(), self.store.selection())
        else {
            self.message = "Nothing to redo.".to_string();
            return false;
        };
        self.restore(snapshot.records, snapshot.selection);
        self.message = format!("Redo: {}. File has unsaved changes.", snapshot.description);
        true
    }

    /// Starts an empty, untitled document after settling unsaved changes.
    pub fn new_document(&mut self, prompter: &mut dyn Prompter) -> bool {
        self.commit_pending_edits();
        if !self.settle_unsaved(prompter, "creating a new file") {
            return false;
        }
        self.install(Vec::new(), None, Some("New Empty File"));
        self.message = "New file created. Add items or load data.".to_string();
        true
    }

    /// Replaces the document with the contents of `path`. A malformed line
    /// leaves an empty untitled session behind; an I/O failure leaves the
    /// current document untouched.
    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        self.commit_pending_edits();
        match jsonl::read_all(path) {
            Ok(records) => {
                let count = records.len();
                self.install(records, Some(path.to_path_buf()), Some("Initial Load"));
                self.message = format!("Loaded {} items from {}", count, self.file_label());
                Ok(())
            }
            Err(err @ EditorError::Parse { .. }) => {
                tracing::warn!(path = %path.display(), %err, "discarding document after parse failure");
                self.install(Vec::new(), None, None);
                self.message = "Ready".to_string();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Open flow: settle unsaved changes, ask for a path, load it.
    pub fn open_with(&mut self, prompter: &mut dyn Prompter) -> bool {
        self.commit_pending_edits();
        if !self.settle_unsaved(prompter, "loading a new file") {
            return false;
        }
        let Some(path) = prompter.choose_open_path() else {
            self.message = "Open cancelled.".to_string();
            return false;
        };
        self.load_reporting(prompter, &path)
    }

    /// Like [`Session::open_with`] for a path already known (recent files,
    /// command line).
    pub fn open_path(&mut self, prompter: &mut dyn Prompter, path: &Path) -> bool {
        self.commit_pending_edits();
        if !self.settle_unsaved(prompter, "loading a new file") {
            return false;
        }
        self.load_reporting(prompter, path)
    }

    fn load_reporting(&mut self, prompter: &mut dyn Prompter, path: &Path) -> bool {
        match self.load_from(path) {
            Ok(()) => true,
            Err(err) => {
                self.report(prompter, "Error loading file", &err);
                false
            }
        }
    }

    /// Writes to the bound path, or falls through to Save As when untitled.
    pub fn save_to_current_path(&mut self, prompter: &mut dyn Prompter) -> bool {
        self.commit_pending_edits();
        let Some(path) = self.file_path.clone() else {
            return self.save_as_with(prompter);
        };
        if !self.confirm_empty_save(prompter) {
            return false;
        }
        match self.write_records(&path, false) {
            Ok(()) => true,
            Err(err) => {
                self.report(prompter, "Save Error", &err);
                false
            }
        }
    }

    /// Writes to `path` and binds it as the current file once the write
    /// succeeded.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.commit_pending_edits();
        self.write_records(path, false)?;
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Save As flow: confirm an empty, never-saved document, ask for a
    /// path, write.
    pub fn save_as_with(&mut self, prompter: &mut dyn Prompter) -> bool {
        self.commit_pending_edits();
        if self.file_path.is_none() && !self.confirm_empty_save(prompter) {
            return false;
        }
        let suggested = self.file_label();
        let Some(path) = prompter.choose_save_path(&suggested) else {
            self.message = "Save As cancelled.".to_string();
            return false;
        };
        match self.save_as(&path) {
            Ok(()) => true,
            Err(err) => {
                self.report(prompter, "Save Error", &err);
                false
            }
        }
    }

    /// Shutdown check. Returns true when the application may exit.
    pub fn request_close(&mut self, prompter: &mut dyn Prompter) -> bool {
        self.commit_pending_edits();
        if !self.file_dirty {
            return true;
        }
        match prompter.prompt_yes_no_cancel(
            "Unsaved Changes",
            "You have unsaved changes. Save before closing?",
        ) {
            Choice::Yes => self.save_to_current_path(prompter),
            Choice::No => true,
            Choice::Cancel => {
                self.message = "Close cancelled.".to_string();
                false
            }
        }
    }

    // ---- internals ----

    fn valid_selection(&self) -> Option<usize> {
        self.store.selection().filter(|i| *i < self.store.len())
    }

    fn reload_pending(&mut self) {
        self.pending = match self.valid_selection() {
            Some(index) => self.get_field_values(index).unwrap_or_default(),
            None => Default::default(),
        };
        self.field_dirty = false;
        self.revision += 1;
    }

    fn after_structural_change(&mut self) {
        self.duplicates = DuplicateIndex::recompute(self.store.records());
        self.file_dirty = true;
        self.reload_pending();
    }

    fn restore(&mut self, records: Vec<Record>, selection: Option<usize>) {
        self.store.restore(records, selection);
        // Undo and redo always count as unsaved work; there is no record of
        // what the file on disk holds.
        self.after_structural_change();
    }

    // Installs a fresh document with a new history, optionally seeded with
    // the installed state itself
    fn install(&mut self, records: Vec<Record>, path: Option<PathBuf>, seed: Option<&str>) {
        self.store.load(records);
        if !self.store.is_empty() {
            let _ = self.store.select(Some(0));
        }
        self.file_path = path;
        self.duplicates = DuplicateIndex::recompute(self.store.records());
        self.file_dirty = false;
        self.history.clear();
        if let Some(label) = seed {
            self.history
                .push_undo(self.store.records(), self.store.selection(), label);
        }
        self.reload_pending();
    }

    // Yes saves (and must succeed), No discards, Cancel abandons
    fn settle_unsaved(&mut self, prompter: &mut dyn Prompter, action: &str) -> bool {
        if !self.file_dirty {
            return true;
        }
        let question = format!("You have unsaved changes. Save them before {action}?");
        match prompter.prompt_yes_no_cancel("Unsaved Changes", &question) {
            Choice::Yes => self.save_to_current_path(prompter),
            Choice::No => true,
            Choice::Cancel => {
                self.message = "Action cancelled.".to_string();
                false
            }
        }
    }

    fn confirm_empty_save(&mut self, prompter: &mut dyn Prompter) -> bool {
        if !self.store.is_empty() {
            return true;
        }
        if prompter.prompt_yes_no("Empty Data", "The document is empty. Save an empty file?") {
            true
        } else {
            self.message = "Save cancelled.".to_string();
            false
        }
    }

    fn write_records(&mut self, path: &Path, autosave: bool) -> Result<()> {
        jsonl::write_all(path, self.store.records())?;
        self.file_dirty = false;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let verb = if autosave { "Autosaved" } else { "Saved" };
        self.message = format!("{verb} to {name} at {}", Local::now().format("%H:%M:%S"));
        Ok(())
    }

    // `context` names the failed operation; the modal title comes from the
    // error kind
    fn report(&mut self, prompter: &mut dyn Prompter, context: &str, err: &EditorError) {
        tracing::error!(%err, context, "operation failed");
        self.message = format!("{context}: {err}");
        prompter.report_error(err.title(), &format!("{context}.\n\n{err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        yes_no: VecDeque<bool>,
        yes_no_cancel: VecDeque<Choice>,
        errors: Vec<String>,
    }

    impl Prompter for Scripted {
        fn prompt_yes_no_cancel(&mut self, _: &str, _: &str) -> Choice {
            self.yes_no_cancel.pop_front().unwrap_or(Choice::Cancel)
        }
        fn prompt_yes_no(&mut self, _: &str, _: &str) -> bool {
            self.yes_no.pop_front().unwrap_or(false)
        }
        fn choose_open_path(&mut self) -> Option<PathBuf> {
            None
        }
        fn choose_save_path(&mut self, _: &str) -> Option<PathBuf> {
            None
        }
        fn report_error(&mut self, title: &str, _: &str) {
            self.errors.push(title.to_string());
        }
    }

    fn session_with(inputs: &[&str]) -> Session {
        let mut session = Session::new();
        session.install(
            inputs.iter().map(|i| Record::new("x", *i, "o")).collect(),
            None,
            Some("Initial Load"),
        );
        session
    }

    #[test]
    fn keystrokes_without_selection_are_ignored() {
        let mut session = Session::new();
        assert!(!session.set_pending_field_value(FieldKey::Input, "lost"));
        assert!(!session.is_field_dirty());
        assert!(!session.is_file_dirty());
    }

    #[test]
    fn commit_trims_and_updates_duplicates() {
        let mut session = session_with(&["a", "b"]);
        assert!(session.duplicates().is_empty());

        session.set_pending_field_value(FieldKey::Input, "  b \n");
        assert!(session.is_field_dirty() && session.is_file_dirty());
        assert!(session.commit_pending_edits());

        assert_eq!(session.records()[0].field(FieldKey::Input), "b");
        assert_eq!(session.duplicates().iter().collect::<Vec<_>>(), vec![0, 1]);
        assert!(!session.is_field_dirty());
        // The pre-edit state equals the seeded load state and is coalesced
        assert_eq!(session.history().peek_undo().unwrap().description, "Initial Load");
        assert_eq!(session.history().undo_depth(), 1);
    }

    #[test]
    fn unchanged_commit_still_snapshots_and_clears_redo() {
        let mut session = session_with(&["a"]);
        session.add_record_after_selection();
        session.undo();
        assert!(!session.can_undo());
        assert!(session.can_redo());

        // Same text as stored: no field write, but the pre-edit state is
        // pushed like any other commit
        assert!(session.set_pending_field_value(FieldKey::Output, "o"));
        assert!(!session.commit_pending_edits());
        assert!(session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.history().peek_undo().unwrap().description, "Edit Item 1");
        assert_eq!(session.records()[0], Record::new("x", "a", "o"));
    }

    #[test]
    fn field_values_follow_the_store() {
        let mut session = session_with(&["a", "b"]);
        assert_eq!(
            session.get_field_values(1).unwrap(),
            ["x".to_string(), "b".to_string(), "o".to_string()]
        );
        assert!(matches!(
            session.get_field_values(2),
            Err(EditorError::IndexOutOfRange { index: 2, len: 2 })
        ));

        session.set_pending_field_value(FieldKey::Input, " edited ");
        session.select_index(1);
        assert_eq!(session.get_field_values(0).unwrap()[1], "edited");
        assert_eq!(session.pending_field(FieldKey::Input), "b");
    }

    #[test]
    fn selecting_commits_the_previous_record() {
        let mut session = session_with(&["a", "b"]);
        session.set_pending_field_value(FieldKey::Instruction, "edited");
        let before = session.revision();
        assert!(session.select_index(1));
        assert_eq!(session.records()[0].field(FieldKey::Instruction), "edited");
        assert_eq!(session.pending_field(FieldKey::Input), "b");
        assert!(session.revision() > before);
        assert!(!session.select_index(9));
    }

    #[test]
    fn add_inserts_after_selection() {
        let mut session = session_with(&["a", "b"]);
        session.add_record_after_selection();
        assert_eq!(session.selection(), Some(1));
        assert_eq!(session.records()[1], Record::template());
        assert_eq!(session.len(), 3);
        assert!(session.is_file_dirty());
        assert_eq!(session.pending_field(FieldKey::Instruction), "New instruction");
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut session = session_with(&["a"]);
        let mut prompter = Scripted::default();
        prompter.yes_no.push_back(false);
        assert!(!session.delete_selected(&mut prompter));
        assert_eq!(session.len(), 1);
        assert!(!session.is_file_dirty());
    }

    #[test]
    fn delete_without_selection_reports() {
        let mut session = Session::new();
        let mut prompter = Scripted::default();
        assert!(!session.delete_selected(&mut prompter));
        assert_eq!(prompter.errors, vec!["Delete Item".to_string()]);
    }

    #[test]
    fn undo_marks_file_dirty_even_when_returning_to_saved_state() {
        let mut session = session_with(&["a"]);
        session.add_record_after_selection();
        session.file_dirty = false;
        assert!(session.undo());
        assert!(session.is_file_dirty());
        assert_eq!(session.len(), 1);
        assert_eq!(session.message(), "Undo: Initial Load. File has unsaved changes.");
        assert!(session.redo());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn pending_edit_before_redo_invalidates_it() {
        let mut session = session_with(&["a"]);
        session.add_record_after_selection();
        session.undo();
        assert!(session.can_redo());
        session.set_pending_field_value(FieldKey::Output, "changed");
        assert!(!session.redo());
        assert!(!session.can_redo());
        assert_eq!(session.records()[0].field(FieldKey::Output), "changed");
    }

    #[test]
    fn close_with_unsaved_changes_respects_cancel_and_discard() {
        let mut session = session_with(&["a"]);
        session.add_record_after_selection();

        let mut prompter = Scripted::default();
        prompter.yes_no_cancel.push_back(Choice::Cancel);
        assert!(!session.request_close(&mut prompter));

        prompter.yes_no_cancel.push_back(Choice::No);
        assert!(session.request_close(&mut prompter));
    }

    #[test]
    fn close_aborts_when_save_as_is_dismissed() {
        let mut session = session_with(&["a"]);
        session.add_record_after_selection();
        let mut prompter = Scripted::default();
        prompter.yes_no_cancel.push_back(Choice::Yes);
        assert!(!session.request_close(&mut prompter));
        assert!(session.is_file_dirty());
    }

    #[test]
    fn status_summary_reflects_dirty_state() {
        let mut session = session_with(&["a"]);
        let summary = session.get_status_summary();
        assert_eq!(summary.file_label, UNTITLED_FILE_NAME);
        assert_eq!(summary.dirty_marker, "");
        session.add_record_after_selection();
        assert_eq!(session.get_status_summary().dirty_marker, "*");
    }

    #[test]
    fn display_rows_flag_duplicates() {
        let session = session_with(&["same", "other", " same"]);
        let rows = session.get_display_rows();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_duplicate && !rows[1].is_duplicate && rows[2].is_duplicate);
        assert_eq!(rows[1].label(), "Item 2: x...");
    }
}
