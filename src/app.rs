use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::config::Settings;
use crate::dialogs::TerminalPrompter;
use crate::file_browser::FileBrowser;
use crate::input::{global_action, Action};
use crate::pane::TextPane;
use crate::prompt::Prompter;
use crate::record::FieldKey;
use crate::session::Session;
use crate::theme::Theme;
use crate::ui::{self, Term};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    List,
    Field(FieldKey),
}

impl Focus {
    // List -> instruction -> input -> output -> List
    pub fn next(self) -> Focus {
        match self {
            Focus::List => Focus::Field(FieldKey::Instruction),
            Focus::Field(FieldKey::Instruction) => Focus::Field(FieldKey::Input),
            Focus::Field(FieldKey::Input) => Focus::Field(FieldKey::Output),
            Focus::Field(FieldKey::Output) => Focus::List,
        }
    }

    pub fn prev(self) -> Focus {
        match self {
            Focus::List => Focus::Field(FieldKey::Output),
            Focus::Field(FieldKey::Instruction) => Focus::List,
            Focus::Field(FieldKey::Input) => Focus::Field(FieldKey::Instruction),
            Focus::Field(FieldKey::Output) => Focus::Field(FieldKey::Input),
        }
    }
}

pub struct App {
    pub session: Session,
    pub panes: [TextPane; 3],
    pub focus: Focus,
    pub theme: Theme,
    pub settings: Settings,
    pub browser: FileBrowser,
    pub show_help: bool,
    pub should_quit: bool,
    config_dir: PathBuf,
    last_revision: Option<u64>,
}

impl App {
    pub fn new(settings: Settings, config_dir: PathBuf) -> Self {
        let mut session = Session::new();
        session.set_autosave_on_blur(settings.autosave_on_blur);
        App {
            session,
            panes: Default::default(),
            focus: Focus::List,
            theme: Theme::named(settings.theme),
            settings,
            browser: FileBrowser::new(),
            show_help: false,
            should_quit: false,
            config_dir,
            last_revision: None,
        }
    }

    pub fn pane(&self, key: FieldKey) -> &TextPane {
        &self.panes[key.index()]
    }

    /// Reloads the panes when the session replaced their text.
    pub fn sync_panes(&mut self) {
        let revision = self.session.revision();
        if self.last_revision == Some(revision) {
            return;
        }
        for key in FieldKey::ALL {
            self.panes[key.index()].set_content(self.session.pending_field(key));
        }
        self.last_revision = Some(revision);
    }

    // Runs `op` with a prompter that draws over the main window
    fn with_prompter<R>(
        &mut self,
        terminal: &mut Term,
        op: impl FnOnce(&mut Session, &mut dyn Prompter) -> R,
    ) -> R {
        let mut prompter = TerminalPrompter::new(terminal, self.theme, &mut self.browser);
        op(&mut self.session, &mut prompter)
    }

    pub fn handle_key(&mut self, terminal: &mut Term, key: KeyEvent) {
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        if let Some(action) = global_action(&key) {
            self.perform(terminal, action);
            return;
        }

        match self.focus {
            Focus::List => self.handle_list_key(key),
            Focus::Field(field) => self.handle_pane_key(field, key),
        }
    }

    pub fn perform(&mut self, terminal: &mut Term, action: Action) {
        tracing::debug!(?action, "action");
        match action {
            Action::New => {
                self.with_prompter(terminal, |s, p| s.new_document(p));
            }
            Action::Open => {
                if self.with_prompter(terminal, |s, p| s.open_with(p)) {
                    self.remember_current_file();
                }
            }
            Action::Save => {
                if self.with_prompter(terminal, |s, p| s.save_to_current_path(p)) {
                    self.remember_current_file();
                }
            }
            Action::SaveAs => {
                if self.with_prompter(terminal, |s, p| s.save_as_with(p)) {
                    self.remember_current_file();
                }
            }
            Action::Undo => {
                self.session.undo();
            }
            Action::Redo => {
                self.session.redo();
            }
            Action::AddItem => {
                self.session.add_record_after_selection();
                self.focus = Focus::Field(FieldKey::Instruction);
            }
            Action::DeleteItem => {
                self.with_prompter(terminal, |s, p| s.delete_selected(p));
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::ToggleAutosave => self.toggle_autosave(),
            Action::OpenRecent(index) => self.open_recent(terminal, index),
            Action::FocusNext => self.set_focus(terminal, self.focus.next()),
            Action::FocusPrev => self.set_focus(terminal, self.focus.prev()),
            Action::Help => self.show_help = true,
            Action::Quit => self.request_quit(terminal),
        }
    }

    fn set_focus(&mut self, terminal: &mut Term, focus: Focus) {
        if let Focus::Field(_) = self.focus {
            if focus != self.focus {
                self.with_prompter(terminal, |s, p| s.focus_lost(p));
            }
        }
        self.focus = focus;
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let len = self.session.len();
        if len == 0 {
            return;
        }
        let current = self.session.selection();
        let target = match key.code {
            KeyCode::Up => current.map_or(0, |i| i.saturating_sub(1)),
            KeyCode::Down => current.map_or(0, |i| (i + 1).min(len - 1)),
            KeyCode::PageUp => current.map_or(0, |i| i.saturating_sub(10)),
            KeyCode::PageDown => current.map_or(0, |i| (i + 10).min(len - 1)),
            KeyCode::Home => 0,
            KeyCode::End => len - 1,
            KeyCode::Enter => {
                self.focus = Focus::Field(FieldKey::Instruction);
                return;
            }
            _ => return,
        };
        self.session.select_index(target);
    }

    fn handle_pane_key(&mut self, field: FieldKey, key: KeyEvent) {
        if !self.session.has_selection() {
            if matches!(key.code, KeyCode::Char(_) | KeyCode::Enter | KeyCode::Backspace | KeyCode::Delete) {
                self.session
                    .set_message("No item selected. Add an item (Ctrl+A) or open a file.");
            }
            return;
        }

        let pane = &mut self.panes[field.index()];
        let edited = match key.code {
            KeyCode::Char(c) => {
                pane.insert_char(c);
                true
            }
            KeyCode::Enter => {
                pane.insert_char('\n');
                true
            }
            KeyCode::Backspace => pane.delete_char(),
            KeyCode::Delete => pane.delete_forward(),
            KeyCode::Left => {
                pane.move_cursor_left();
                false
            }
            KeyCode::Right => {
                pane.move_cursor_right();
                false
            }
            KeyCode::Up => {
                pane.move_cursor_up();
                false
            }
            KeyCode::Down => {
                pane.move_cursor_down();
                false
            }
            KeyCode::Home => {
                pane.move_cursor_home();
                false
            }
            KeyCode::End => {
                pane.move_cursor_end();
                false
            }
            KeyCode::PageUp => {
                pane.page_up();
                false
            }
            KeyCode::PageDown => {
                pane.page_down();
                false
            }
            _ => false,
        };

        if edited {
            let text = pane.content();
            self.session.set_pending_field_value(field, &text);
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.settings.theme = self.theme.name;
        self.save_settings();
        self.session
            .set_message(format!("Switched to {} theme.", self.theme.name.as_str()));
    }

    fn toggle_autosave(&mut self) {
        let enabled = !self.session.autosave_on_blur();
        self.session.set_autosave_on_blur(enabled);
        self.settings.autosave_on_blur = enabled;
        self.save_settings();
        let state = if enabled { "On" } else { "Off" };
        self.session
            .set_message(format!("Autosave on focus loss: {state}"));
    }

    fn open_recent(&mut self, terminal: &mut Term, index: usize) {
        let Some(path) = self.settings.recent_files.get(index).cloned() else {
            self.session
                .set_message(format!("Invalid recent file number: {}", index + 1));
            return;
        };
        if !path.exists() {
            self.settings.recent_files.remove(index);
            self.save_settings();
            self.session
                .set_message(format!("Recent file not found: {}", path.display()));
            return;
        }
        if self.with_prompter(terminal, |s, p| s.open_path(p, &path)) {
            self.remember_current_file();
        }
    }

    /// Opens a file named on the command line.
    pub fn open_initial(&mut self, terminal: &mut Term, path: &Path) {
        if self.with_prompter(terminal, |s, p| s.open_path(p, path)) {
            self.remember_current_file();
        }
    }

    fn request_quit(&mut self, terminal: &mut Term) {
        if self.with_prompter(terminal, |s, p| s.request_close(p)) {
            self.should_quit = true;
        }
    }

    fn remember_current_file(&mut self) {
        if let Some(path) = self.session.file_path() {
            let path = path.to_path_buf();
            self.settings.add_recent(&path);
            self.save_settings();
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save_to(&self.config_dir) {
            tracing::warn!(dir = %self.config_dir.display(), error = %e, "failed to save settings");
        }
    }

    pub fn shutdown(&self) {
        self.save_settings();
        tracing::info!("shutting down");
    }
}

pub fn run(terminal: &mut Term, app: &mut App) -> io::Result<()> {
    loop {
        app.sync_panes();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(terminal, key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    app.shutdown();
    Ok(())
}
