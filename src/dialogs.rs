//! Modal dialogs for the terminal front end.
//!
//! Each dialog runs its own small event loop on top of the main terminal
//! and returns once the user has answered, so session operations can ask
//! their questions synchronously through [`Prompter`].

use std::path::PathBuf;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::file_browser::FileBrowser;
use crate::prompt::{Choice, Prompter};
use crate::theme::Theme;
use crate::ui::{centered_rect, Frame, Term};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Buttons {
    YesNoCancel,
    YesNo,
    Ok,
}

pub struct TerminalPrompter<'a> {
    terminal: &'a mut Term,
    theme: Theme,
    browser: &'a mut FileBrowser,
}

impl<'a> TerminalPrompter<'a> {
    pub fn new(terminal: &'a mut Term, theme: Theme, browser: &'a mut FileBrowser) -> Self {
        TerminalPrompter {
            terminal,
            theme,
            browser,
        }
    }

    // Blocks until the next key press. None means the terminal is gone.
    fn next_key(&mut self) -> Option<KeyEvent> {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => return Some(key),
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read terminal event");
                    return None;
                }
            }
        }
    }

    fn show_message(&mut self, title: &str, message: &str, buttons: Buttons) -> bool {
        let theme = self.theme;
        match self
            .terminal
            .draw(|f| render_message_dialog(f, &theme, title, message, buttons))
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to draw dialog");
                false
            }
        }
    }

    fn draw_browser(&mut self, title: &str, show_filename_input: bool) -> bool {
        let theme = self.theme;
        let browser = &*self.browser;
        match self
            .terminal
            .draw(|f| render_file_dialog(f, &theme, browser, title, show_filename_input))
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to draw file dialog");
                false
            }
        }
    }
}

impl Prompter for TerminalPrompter<'_> {
    fn prompt_yes_no_cancel(&mut self, title: &str, message: &str) -> Choice {
        if !self.show_message(title, message, Buttons::YesNoCancel) {
            return Choice::Cancel;
        }
        while let Some(key) = self.next_key() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Choice::Yes,
                KeyCode::Char('n') | KeyCode::Char('N') => return Choice::No,
                KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => return Choice::Cancel,
                _ => {}
            }
        }
        Choice::Cancel
    }

    fn prompt_yes_no(&mut self, title: &str, message: &str) -> bool {
        if !self.show_message(title, message, Buttons::YesNo) {
            return false;
        }
        while let Some(key) = self.next_key() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return true,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return false,
                _ => {}
            }
        }
        false
    }

    fn choose_open_path(&mut self) -> Option<PathBuf> {
        self.browser.prepare_for_open();
        loop {
            if !self.draw_browser("Open JSONL File (.jsonl)", false) {
                return None;
            }
            let key = self.next_key()?;
            match key.code {
                KeyCode::Esc => return None,
                KeyCode::Up => self.browser.navigate_up(),
                KeyCode::Down => self.browser.navigate_down(),
                KeyCode::Enter => {
                    if !self.browser.enter_directory() {
                        if let Some(path) = self.browser.selected_file() {
                            return Some(path);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn choose_save_path(&mut self, suggested: &str) -> Option<PathBuf> {
        self.browser.prepare_for_save(suggested);
        loop {
            if !self.draw_browser("Save JSONL File As (.jsonl)", true) {
                return None;
            }
            let key = self.next_key()?;
            let target = match key.code {
                KeyCode::Esc => return None,
                KeyCode::Tab => {
                    self.browser.is_editing_filename = !self.browser.is_editing_filename;
                    None
                }
                KeyCode::Enter if self.browser.is_editing_filename => self.browser.save_target(),
                KeyCode::Enter => {
                    if self.browser.enter_directory() {
                        None
                    } else {
                        self.browser.save_target()
                    }
                }
                KeyCode::Char(c) if self.browser.is_editing_filename => {
                    self.browser.filename_input.push(c);
                    None
                }
                KeyCode::Backspace if self.browser.is_editing_filename => {
                    self.browser.filename_input.pop();
                    None
                }
                KeyCode::Up if !self.browser.is_editing_filename => {
                    self.browser.navigate_up();
                    None
                }
                KeyCode::Down if !self.browser.is_editing_filename => {
                    self.browser.navigate_down();
                    None
                }
                _ => None,
            };

            if let Some(path) = target {
                if path.is_dir() {
                    continue;
                }
                if path.exists() {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let question = format!("{name} already exists. Replace it?");
                    if !self.prompt_yes_no("Confirm Save As", &question) {
                        continue;
                    }
                }
                return Some(path);
            }
        }
    }

    fn report_error(&mut self, title: &str, message: &str) {
        if !self.show_message(title, message, Buttons::Ok) {
            return;
        }
        while let Some(key) = self.next_key() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                return;
            }
        }
    }
}

fn render_backdrop(f: &mut Frame, theme: &Theme) -> Rect {
    let area = f.size();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        area,
    );
    area
}

fn render_message_dialog(f: &mut Frame, theme: &Theme, title: &str, message: &str, buttons: Buttons) {
    let area = render_backdrop(f, theme);
    let dialog_area = centered_rect(60, 40, area);

    let mut text = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    text.extend(message.lines().map(|l| Line::from(l.to_string())));
    text.push(Line::from(""));
    let key_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    text.push(match buttons {
        Buttons::YesNoCancel => Line::from(vec![
            Span::styled("  [Y]", key_style),
            Span::raw("es "),
            Span::styled("  [N]", key_style),
            Span::raw("o "),
            Span::styled("  [Esc]", key_style),
            Span::raw(" Cancel"),
        ]),
        Buttons::YesNo => Line::from(vec![
            Span::styled("  [Y]", key_style),
            Span::raw("es "),
            Span::styled("  [N]", key_style),
            Span::raw("o"),
        ]),
        Buttons::Ok => Line::from(vec![Span::styled("  [Enter]", key_style), Span::raw(" OK")]),
    });

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(theme.text_bg).fg(theme.fg))
        .block(Block::default().borders(Borders::ALL).title("Confirm"));

    f.render_widget(Clear, dialog_area);
    f.render_widget(paragraph, dialog_area);
}

fn render_file_dialog(
    f: &mut Frame,
    theme: &Theme,
    browser: &FileBrowser,
    title: &str,
    show_filename_input: bool,
) {
    let area = render_backdrop(f, theme);
    let dialog_block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner_area = dialog_block.inner(area);

    let constraints = if show_filename_input {
        vec![
            Constraint::Length(1), // current directory
            Constraint::Min(0),    // entries
            Constraint::Length(1), // filename
            Constraint::Length(1), // hint
        ]
    } else {
        vec![Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner_area);

    f.render_widget(dialog_block, area);

    let current_dir_text = Paragraph::new(browser.current_dir.to_string_lossy().to_string())
        .style(Style::default().fg(theme.accent));
    f.render_widget(current_dir_text, chunks[0]);

    let items: Vec<ListItem> = browser
        .get_entries_for_display()
        .into_iter()
        .map(ListItem::new)
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(theme.fg))
        .highlight_style(Style::default().bg(theme.select_bg).fg(theme.select_fg))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if !browser.entries.is_empty() {
        list_state.select(Some(browser.selected_idx.min(browser.entries.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut list_state);

    let hint_index = if show_filename_input {
        let filename_style = if browser.is_editing_filename {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.fg)
        };
        let filename_para = Paragraph::new(format!("Filename: {}", browser.filename_input))
            .style(filename_style);
        f.render_widget(filename_para, chunks[2]);
        if browser.is_editing_filename {
            let offset = "Filename: ".len() + browser.filename_input.chars().count();
            f.set_cursor(chunks[2].x + offset as u16, chunks[2].y);
        }
        3
    } else {
        2
    };

    let hint_text = if show_filename_input {
        "Arrows: Navigate | Enter: Confirm/Select | Tab: Edit Filename | Esc: Cancel"
    } else {
        "Arrows: Navigate | Enter: Open/Select | Esc: Cancel"
    };
    let hint = Paragraph::new(hint_text).style(Style::default().fg(theme.disabled_fg));
    f.render_widget(hint, chunks[hint_index]);
}
