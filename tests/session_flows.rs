use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use jsonlquill::prompt::{Choice, Prompter};
use jsonlquill::record::FieldKey;
use jsonlquill::session::Session;
use pretty_assertions::assert_eq;

/// Answers questions from queues; an exhausted queue means "cancel".
#[derive(Default)]
struct Scripted {
    yes_no: VecDeque<bool>,
    yes_no_cancel: VecDeque<Choice>,
    open_paths: VecDeque<PathBuf>,
    save_paths: VecDeque<PathBuf>,
    errors: Vec<(String, String)>,
    questions: Vec<String>,
}

impl Prompter for Scripted {
    fn prompt_yes_no_cancel(&mut self, title: &str, _: &str) -> Choice {
        self.questions.push(title.to_string());
        self.yes_no_cancel.pop_front().unwrap_or(Choice::Cancel)
    }

    fn prompt_yes_no(&mut self, title: &str, _: &str) -> bool {
        self.questions.push(title.to_string());
        self.yes_no.pop_front().unwrap_or(false)
    }

    fn choose_open_path(&mut self) -> Option<PathBuf> {
        self.open_paths.pop_front()
    }

    fn choose_save_path(&mut self, _: &str) -> Option<PathBuf> {
        self.save_paths.pop_front()
    }

    fn report_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }
}

const THREE_LINES: &str = concat!(
    r#"{"instruction":"i1","input":"same","output":"o1"}"#,
    "\n",
    r#"{"instruction":"i2","input":"other","output":"o2"}"#,
    "\n",
    r#"{"instruction":"i3","input":"  same ","output":"o3"}"#,
    "\n",
);

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn loaded(dir: &Path) -> (Session, PathBuf) {
    let path = write_file(dir, "data.jsonl", THREE_LINES);
    let mut session = Session::new();
    session.load_from(&path).unwrap();
    (session, path)
}

fn duplicates(session: &Session) -> Vec<usize> {
    session.duplicates().iter().collect()
}

#[test]
fn load_selects_first_record_and_seeds_history() {
    let dir = tempfile::tempdir().unwrap();
    let (session, _) = loaded(dir.path());

    assert_eq!(session.len(), 3);
    assert_eq!(session.selection(), Some(0));
    assert_eq!(session.pending_field(FieldKey::Instruction), "i1");
    assert!(!session.is_file_dirty());
    assert_eq!(session.history().undo_depth(), 1);
    assert_eq!(session.history().peek_undo().unwrap().description, "Initial Load");
    assert_eq!(session.message(), "Loaded 3 items from data.jsonl");
}

#[test]
fn deleting_between_duplicates_reindexes_them() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = loaded(dir.path());
    assert_eq!(duplicates(&session), vec![0, 2]);

    let mut prompter = Scripted::default();
    prompter.yes_no.push_back(true);
    assert!(session.select_index(1));
    assert!(session.delete_selected(&mut prompter));

    assert_eq!(session.len(), 2);
    assert_eq!(duplicates(&session), vec![0, 1]);
    assert_eq!(session.selection(), Some(1));
    assert!(session.is_file_dirty());
    assert_eq!(prompter.questions, vec!["Confirm Delete".to_string()]);
}

#[test]
fn undo_then_redo_restores_each_state() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = loaded(dir.path());
    let original = session.records().to_vec();

    session.set_pending_field_value(FieldKey::Output, "changed");
    session.select_index(2);
    let edited = session.records().to_vec();
    assert_eq!(edited[0].field(FieldKey::Output), "changed");

    assert!(session.undo());
    assert_eq!(session.records(), original.as_slice());
    assert_eq!(session.selection(), Some(0));
    assert_eq!(session.pending_field(FieldKey::Output), "o1");

    assert!(session.redo());
    assert_eq!(session.records(), edited.as_slice());
    assert!(session.is_file_dirty());
}

#[test]
fn undoing_every_mutation_returns_to_the_loaded_state() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = loaded(dir.path());
    let mut states = vec![(session.records().to_vec(), session.selection())];

    session.set_pending_field_value(FieldKey::Input, "edited");
    assert!(session.commit_pending_edits());
    states.push((session.records().to_vec(), session.selection()));

    session.add_record_after_selection();
    // Selecting is not a mutation; the delete snapshot carries this selection
    assert!(session.select_index(2));
    states.push((session.records().to_vec(), session.selection()));

    let mut prompter = Scripted::default();
    prompter.yes_no.push_back(true);
    assert!(session.delete_selected(&mut prompter));
    let last = (session.records().to_vec(), session.selection());

    for (records, selection) in states.iter().rev() {
        assert!(session.undo());
        assert_eq!(session.records(), records.as_slice());
        assert_eq!(session.selection(), *selection);
    }
    assert!(!session.undo());
    assert_eq!(session.records(), states[0].0.as_slice());
    assert_eq!(duplicates(&session), vec![0, 2]);

    for _ in 0..3 {
        assert!(session.redo());
    }
    assert!(!session.can_redo());
    assert_eq!((session.records().to_vec(), session.selection()), last);
}

#[test]
fn new_mutation_discards_redo() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = loaded(dir.path());

    session.add_record_after_selection();
    session.undo();
    assert!(session.can_redo());

    session.add_record_after_selection();
    assert!(!session.can_redo());
    assert!(!session.redo());
    assert_eq!(session.message(), "Nothing to redo.");
}

#[test]
fn save_and_reload_preserves_records_and_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "extra.jsonl",
        "{\"instruction\":\"keep\",\"meta\":{\"id\":7}}\n\n{\"input\":\"x\"}\n",
    );
    let mut session = Session::new();
    session.load_from(&path).unwrap();
    assert_eq!(session.len(), 2);

    let mut prompter = Scripted::default();
    session.set_pending_field_value(FieldKey::Output, "added");
    assert!(session.save_to_current_path(&mut prompter));
    assert!(!session.is_file_dirty());
    assert!(session.message().starts_with("Saved to extra.jsonl at "));

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "{\"instruction\":\"keep\",\"output\":\"added\",\"meta\":{\"id\":7}}\n{\"input\":\"x\"}\n"
    );

    let mut reloaded = Session::new();
    reloaded.load_from(&path).unwrap();
    assert_eq!(reloaded.records(), session.records());
}

#[test]
fn save_as_binds_the_new_path_only_after_writing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, original) = loaded(dir.path());
    let target = dir.path().join("copy.jsonl");

    let missing_dir = dir.path().join("nope").join("copy.jsonl");
    assert!(session.save_as(&missing_dir).is_err());
    assert_eq!(session.file_path(), Some(original.as_path()));

    session.save_as(&target).unwrap();
    assert_eq!(session.file_path(), Some(target.as_path()));
    assert_eq!(fs::read_to_string(&target).unwrap(), THREE_LINES);
}

#[test]
fn untitled_save_falls_through_to_save_as() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new();
    session.add_record_after_selection();

    let target = dir.path().join("fresh.jsonl");
    let mut prompter = Scripted::default();
    prompter.save_paths.push_back(target.clone());
    assert!(session.save_to_current_path(&mut prompter));
    assert_eq!(session.file_path(), Some(target.as_path()));
    assert_eq!(session.file_label(), "fresh.jsonl");
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "{\"instruction\":\"New instruction\",\"input\":\"\",\"output\":\"\"}\n"
    );
}

#[test]
fn empty_document_save_asks_first() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("empty.jsonl");
    let mut session = Session::new();

    let mut prompter = Scripted::default();
    prompter.save_paths.push_back(target.clone());
    prompter.yes_no.push_back(false);
    assert!(!session.save_as_with(&mut prompter));
    assert!(!target.exists());

    prompter.yes_no.push_back(true);
    assert!(session.save_as_with(&mut prompter));
    assert_eq!(fs::read_to_string(&target).unwrap(), "");
}

#[test]
fn malformed_line_clears_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = loaded(dir.path());
    let bad = write_file(dir.path(), "bad.jsonl", "{\"input\":\"ok\"}\n\n{broken\n");

    let mut prompter = Scripted::default();
    assert!(!session.open_path(&mut prompter, &bad));

    assert!(session.is_empty());
    assert_eq!(session.selection(), None);
    assert_eq!(session.file_path(), None);
    assert!(!session.is_file_dirty());
    assert!(!session.can_undo());
    let (title, message) = &prompter.errors[0];
    assert_eq!(title, "JSON Error");
    assert!(message.starts_with("Error loading file."), "{message}");
    assert!(message.contains("line 3"), "{message}");
    assert!(message.contains("{broken"), "{message}");
}

#[test]
fn unreadable_file_leaves_the_session_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    session.add_record_after_selection();

    let err = session.load_from(&dir.path().join("missing.jsonl")).unwrap_err();
    assert_eq!(err.title(), "File Error");
    assert_eq!(session.len(), 4);
    assert_eq!(session.file_path(), Some(path.as_path()));
    assert!(session.is_file_dirty());
}

#[test]
fn focus_loss_autosaves_to_the_bound_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    let mut prompter = Scripted::default();

    session.set_pending_field_value(FieldKey::Instruction, "rewritten");
    session.focus_lost(&mut prompter);

    assert!(!session.is_file_dirty());
    assert!(session.message().starts_with("Autosaved to data.jsonl at "));
    let first_line = fs::read_to_string(&path).unwrap().lines().next().unwrap().to_string();
    assert_eq!(first_line, r#"{"instruction":"rewritten","input":"same","output":"o1"}"#);
}

#[test]
fn focus_loss_without_autosave_only_commits() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    session.set_autosave_on_blur(false);
    let mut prompter = Scripted::default();

    session.set_pending_field_value(FieldKey::Instruction, "rewritten");
    session.focus_lost(&mut prompter);

    assert_eq!(session.records()[0].field(FieldKey::Instruction), "rewritten");
    assert!(session.is_file_dirty());
    assert_eq!(fs::read_to_string(&path).unwrap(), THREE_LINES);
}

#[test]
fn open_with_unsaved_changes_can_save_first() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    let other = write_file(dir.path(), "other.jsonl", "{\"input\":\"z\"}\n");
    session.add_record_after_selection();

    let mut prompter = Scripted::default();
    prompter.yes_no_cancel.push_back(Choice::Yes);
    prompter.open_paths.push_back(other.clone());
    assert!(session.open_with(&mut prompter));

    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 4);
    assert_eq!(session.file_path(), Some(other.as_path()));
    assert_eq!(session.len(), 1);
}

#[test]
fn cancelled_new_keeps_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = loaded(dir.path());
    session.add_record_after_selection();

    let mut prompter = Scripted::default();
    prompter.yes_no_cancel.push_back(Choice::Cancel);
    assert!(!session.new_document(&mut prompter));
    assert_eq!(session.len(), 4);

    prompter.yes_no_cancel.push_back(Choice::No);
    assert!(session.new_document(&mut prompter));
    assert!(session.is_empty());
    assert_eq!(session.file_path(), None);
    assert_eq!(session.history().peek_undo().unwrap().description, "New Empty File");
}

#[test]
fn close_saves_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    session.set_pending_field_value(FieldKey::Input, "unique");

    let mut prompter = Scripted::default();
    prompter.yes_no_cancel.push_back(Choice::Yes);
    assert!(session.request_close(&mut prompter));
    assert!(fs::read_to_string(&path).unwrap().contains("\"unique\""));
}

#[test]
fn duplicate_scenario_survives_deleting_the_middle_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "dups.jsonl",
        concat!(
            r#"{"instruction":"x","input":"dup","output":"o1"}"#,
            "\n",
            r#"{"instruction":"y","input":"other","output":"o2"}"#,
            "\n",
            r#"{"instruction":"z","input":"dup","output":"o3"}"#,
        ),
    );
    let mut session = Session::new();
    session.load_from(&path).unwrap();
    assert_eq!(duplicates(&session), vec![0, 2]);

    let mut prompter = Scripted::default();
    prompter.yes_no.push_back(true);
    session.select_index(1);
    session.delete_selected(&mut prompter);

    assert_eq!(session.len(), 2);
    assert_eq!(duplicates(&session), vec![0, 1]);
    let rows = session.get_display_rows();
    assert!(rows.iter().all(|row| row.is_duplicate));
    assert_eq!(rows[1].label(), "Item 2: z...");
}

#[test]
fn failed_save_keeps_the_document_dirty() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    session.set_pending_field_value(FieldKey::Output, "unsaved");

    // A directory where the bound file used to be makes every write fail
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let mut prompter = Scripted::default();
    assert!(!session.save_to_current_path(&mut prompter));
    assert!(session.is_file_dirty());
    assert_eq!(session.records()[0].field(FieldKey::Output), "unsaved");
    let (title, message) = &prompter.errors[0];
    assert_eq!(title, "File Error");
    assert!(message.starts_with("Save Error."), "{message}");
    assert!(session.message().starts_with("Save Error: "));
}

#[test]
fn failed_autosave_keeps_the_document_dirty() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, path) = loaded(dir.path());
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let mut prompter = Scripted::default();
    session.set_pending_field_value(FieldKey::Instruction, "rewritten");
    session.focus_lost(&mut prompter);

    assert!(session.is_file_dirty());
    assert_eq!(session.file_path(), Some(path.as_path()));
    assert_eq!(prompter.errors.len(), 1);
    assert_eq!(prompter.errors[0].0, "File Error");
    assert!(prompter.errors[0].1.starts_with("Autosave Error."));
}

#[test]
fn save_as_of_an_empty_bound_document_does_not_ask() {
    let dir = tempfile::tempdir().unwrap();
    let empty = write_file(dir.path(), "empty.jsonl", "\n");
    let target = dir.path().join("copy.jsonl");
    let mut session = Session::new();
    session.load_from(&empty).unwrap();
    assert!(session.is_empty());

    let mut prompter = Scripted::default();
    prompter.save_paths.push_back(target.clone());
    assert!(session.save_as_with(&mut prompter));
    assert!(prompter.questions.is_empty());
    assert_eq!(fs::read_to_string(&target).unwrap(), "");
    assert_eq!(session.file_path(), Some(target.as_path()));
}

#[test]
fn non_string_values_survive_load_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "mixed.jsonl",
        "{\"instruction\":\"x\",\"input\":null,\"output\":7}\n",
    );
    let mut session = Session::new();
    session.load_from(&path).unwrap();
    assert_eq!(session.pending_field(FieldKey::Input), "");
    assert_eq!(session.pending_field(FieldKey::Output), "7");

    let mut prompter = Scripted::default();
    session.set_pending_field_value(FieldKey::Instruction, "y");
    assert!(session.save_to_current_path(&mut prompter));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\"instruction\":\"y\",\"input\":null,\"output\":7}\n"
    );
}
