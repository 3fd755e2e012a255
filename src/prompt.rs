use std::path::PathBuf;

/// Answer to a yes/no/cancel question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Cancel,
}

/// User-facing questions the session asks while running an operation.
/// The terminal front end answers them with modal dialogs; tests answer
/// them from a script.
pub trait Prompter {
    fn prompt_yes_no_cancel(&mut self, title: &str, message: &str) -> Choice;

    fn prompt_yes_no(&mut self, title: &str, message: &str) -> bool;

    fn choose_open_path(&mut self) -> Option<PathBuf>;

    fn choose_save_path(&mut self, suggested_name: &str) -> Option<PathBuf>;

    fn report_error(&mut self, title: &str, message: &str);
}
