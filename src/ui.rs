use std::io::Stdout;

use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};

use crate::app::{App, Focus};
use crate::input::help_lines;
use crate::record::FieldKey;
use crate::theme::Theme;

pub type Term = Terminal<CrosstermBackend<Stdout>>;
pub type Frame<'a> = tui::Frame<'a, CrosstermBackend<Stdout>>;

pub fn draw(f: &mut Frame, app: &mut App) {
    let theme = app.theme;
    let size = f.size();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // status line
                Constraint::Length(3), // message bar
                Constraint::Min(0),    // content
            ]
            .as_ref(),
        )
        .split(size);

    render_status_line(f, chunks[0], app);

    let message_block = Block::default().borders(Borders::ALL).title("Status");
    let message_area = message_block.inner(chunks[1]);
    let message = Paragraph::new(app.session.message().to_string())
        .style(Style::default().fg(theme.fg))
        .wrap(Wrap { trim: true });
    f.render_widget(message_block, chunks[1]);
    f.render_widget(message, message_area);

    if app.show_help {
        render_help_screen(f, chunks[2], &theme);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(chunks[2]);
    render_item_list(f, columns[0], app);

    let fields = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ]
            .as_ref(),
        )
        .split(columns[1]);
    for (key, area) in FieldKey::ALL.into_iter().zip(fields.iter()) {
        render_field_pane(f, *area, app, key);
    }
}

fn render_status_line(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let session = &app.session;
    let summary = session.get_status_summary();
    let position = match session.selection() {
        Some(i) => format!("Item {} of {}", i + 1, session.len()),
        None => format!("Items: {}", session.len()),
    };
    let autosave = if session.autosave_on_blur() { "On" } else { "Off" };
    let mut spans = vec![
        Span::styled(
            "JSONLQuill",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(format!("File: {}{}", summary.file_label, summary.dirty_marker)),
        Span::raw(" | "),
        Span::raw(position),
        Span::raw(" | "),
        Span::raw(format!("Duplicates: {}", session.duplicates().len())),
        Span::raw(" | "),
        Span::raw(format!("AutoSave: {autosave}")),
    ];
    if let Focus::Field(key) = app.focus {
        let (row, col) = app.pane(key).cursor_position();
        spans.push(Span::raw(" | "));
        spans.push(Span::raw(format!("Ln {row}, Col {col}")));
    }
    let status_bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(theme.status_bg).fg(theme.status_fg));
    f.render_widget(status_bar, area);
}

fn focus_block(title: String, focused: bool, theme: &Theme) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn render_item_list(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let rows = app.session.get_display_rows();
    let title = format!("Items ({})", rows.len());
    let block = focus_block(title, app.focus == Focus::List, theme);

    if rows.is_empty() {
        let hint = Paragraph::new("No items. Ctrl+A adds one, Ctrl+O opens a file.")
            .style(Style::default().fg(theme.disabled_fg))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let style = if row.is_duplicate {
                Style::default().bg(theme.duplicate_bg).fg(theme.duplicate_fg)
            } else {
                Style::default().bg(theme.text_bg).fg(theme.fg)
            };
            ListItem::new(row.label()).style(style)
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.select_bg).fg(theme.select_fg))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.session.selection());
    f.render_stateful_widget(list, area, &mut state);
}

fn render_field_pane(f: &mut Frame, area: Rect, app: &mut App, key: FieldKey) {
    let theme = app.theme;
    let focused = app.focus == Focus::Field(key);
    let enabled = app.session.has_selection();
    let block = focus_block(key.label().to_string(), focused, &theme);
    let inner = block.inner(area);

    let pane = &mut app.panes[key.index()];
    pane.set_visible_height(inner.height as usize);

    let text_style = if enabled {
        Style::default().bg(theme.text_bg).fg(theme.fg)
    } else {
        Style::default().bg(theme.bg).fg(theme.disabled_fg)
    };
    let lines: Vec<Line> = pane
        .visible_lines()
        .iter()
        .map(|l| Line::from(l.clone()))
        .collect();
    f.render_widget(Paragraph::new(lines).style(text_style).block(block), area);

    if focused && enabled && inner.width > 0 && inner.height > 0 {
        let (col, row) = pane.cursor_on_screen();
        let x = inner.x + (col as u16).min(inner.width - 1);
        let y = inner.y + (row as u16).min(inner.height - 1);
        f.set_cursor(x, y);
    }
}

fn render_help_screen(f: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Help - JSONLQuill");
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = help_lines().into_iter().map(ListItem::new).collect();
    let list = List::new(items).style(Style::default().fg(theme.fg));
    f.render_widget(list, inner_area);
}

/// Rectangle of the given percentage size centered in `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);

    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
