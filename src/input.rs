use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Commands reachable from anywhere in the main window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    New,
    Open,
    Save,
    SaveAs,
    Undo,
    Redo,
    AddItem,
    DeleteItem,
    ToggleTheme,
    ToggleAutosave,
    OpenRecent(usize),
    FocusNext,
    FocusPrev,
    Help,
    Quit,
}

/// Maps a key press to a global command. Keys that return None belong to
/// whichever widget has focus.
pub fn global_action(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') if shift => Some(Action::SaveAs),
            KeyCode::Char('S') => Some(Action::SaveAs),
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('n') => Some(Action::New),
            KeyCode::Char('o') => Some(Action::Open),
            KeyCode::Char('z') => Some(Action::Undo),
            KeyCode::Char('y') => Some(Action::Redo),
            KeyCode::Char('a') => Some(Action::AddItem),
            KeyCode::Char('d') => Some(Action::DeleteItem),
            KeyCode::Char('t') => Some(Action::ToggleTheme),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    if alt {
        return match key.code {
            KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::ToggleAutosave),
            KeyCode::Char(c @ '1'..='9') => Some(Action::OpenRecent(c as usize - '1' as usize)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::F(12) => Some(Action::SaveAs),
        KeyCode::F(1) => Some(Action::Help),
        KeyCode::Tab => Some(Action::FocusNext),
        KeyCode::BackTab => Some(Action::FocusPrev),
        KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

pub fn help_lines() -> Vec<String> {
    [
        "JSONLQuill Commands:",
        "",
        "File Operations:",
        "  F1             - Show/Hide Help",
        "  Ctrl+N         - New File",
        "  Ctrl+O         - Open File",
        "  Ctrl+S         - Save",
        "  Ctrl+Shift+S   - Save As... (also F12)",
        "  Alt+1..9       - Open Recent File (1-based)",
        "  Alt+A          - Toggle Autosave on Focus Loss",
        "",
        "Items:",
        "  Ctrl+A         - Add Item After Selection",
        "  Ctrl+D         - Delete Selected Item",
        "  Ctrl+Z         - Undo",
        "  Ctrl+Y         - Redo",
        "  Up/Down        - Select Item (in the item list)",
        "  Items with identical input are highlighted",
        "",
        "Editing:",
        "  Tab/Shift+Tab  - Move Between List, Instruction, Input, Output",
        "  Arrow Keys     - Move Cursor",
        "  Home/End       - Start/End of Line",
        "  PgUp/PgDn      - Page Up/Down",
        "  Enter          - New Line",
        "",
        "View:",
        "  Ctrl+T         - Toggle Light/Dark Theme",
        "",
        "Dialogs:",
        "  Y / N / Esc    - Answer Yes / No / Cancel",
        "  Tab            - Edit Filename (in Save As)",
        "",
        "  Esc / Ctrl+Q   - Quit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
