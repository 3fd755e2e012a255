// Multi-line text pane for one record field
pub struct TextPane {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize, // in chars, not bytes
    scroll_offset: usize,
    visible_height: usize,
}

impl Default for TextPane {
    fn default() -> Self {
        TextPane::new()
    }
}

impl TextPane {
    pub fn new() -> Self {
        TextPane {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            scroll_offset: 0,
            visible_height: 5,
        }
    }

    pub fn set_content(&mut self, content: &str) {
        self.lines = content.split('\n').map(|l| l.to_string()).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.scroll_offset = 0;
    }

    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    fn line_chars(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_at(&self, row: usize, col: usize) -> usize {
        self.lines[row]
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(self.lines[row].len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor_row, self.cursor_col);
        if c == '\n' {
            let rest = self.lines[self.cursor_row].split_off(at);
            self.lines.insert(self.cursor_row + 1, rest);
            self.cursor_row += 1;
            self.cursor_col = 0;
        } else {
            self.lines[self.cursor_row].insert(at, c);
            self.cursor_col += 1;
        }
        self.ensure_cursor_visible();
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(c);
        }
    }

    /// Backspace. Returns whether anything was removed.
    pub fn delete_char(&mut self) -> bool {
        if self.cursor_col > 0 {
            let at = self.byte_at(self.cursor_row, self.cursor_col - 1);
            self.lines[self.cursor_row].remove(at);
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            // At start of line, merge with previous line
            let current_line = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.line_chars(self.cursor_row);
            self.lines[self.cursor_row].push_str(&current_line);
        } else {
            return false;
        }
        self.ensure_cursor_visible();
        true
    }

    /// Delete key. Returns whether anything was removed.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor_col < self.line_chars(self.cursor_row) {
            let at = self.byte_at(self.cursor_row, self.cursor_col);
            self.lines[self.cursor_row].remove(at);
        } else if self.cursor_row + 1 < self.lines.len() {
            let next_line = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next_line);
        } else {
            return false;
        }
        true
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.line_chars(self.cursor_row);
        }
        self.ensure_cursor_visible();
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.line_chars(self.cursor_row) {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
        self.ensure_cursor_visible();
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.line_chars(self.cursor_row));
        }
        self.ensure_cursor_visible();
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.line_chars(self.cursor_row));
        }
        self.ensure_cursor_visible();
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.line_chars(self.cursor_row);
    }

    pub fn page_up(&mut self) {
        let step = self.visible_height.saturating_sub(1).max(1);
        self.cursor_row = self.cursor_row.saturating_sub(step);
        self.cursor_col = self.cursor_col.min(self.line_chars(self.cursor_row));
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) {
        let step = self.visible_height.saturating_sub(1).max(1);
        self.cursor_row = (self.cursor_row + step).min(self.lines.len() - 1);
        self.cursor_col = self.cursor_col.min(self.line_chars(self.cursor_row));
        self.ensure_cursor_visible();
    }

    /// Called by the renderer with the pane's inner height.
    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height.max(1);
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        if self.cursor_row < self.scroll_offset {
            self.scroll_offset = self.cursor_row;
        } else if self.cursor_row >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.cursor_row + 1 - self.visible_height;
        }
    }

    pub fn visible_lines(&self) -> &[String] {
        let end = (self.scroll_offset + self.visible_height).min(self.lines.len());
        &self.lines[self.scroll_offset.min(end)..end]
    }

    /// Cursor relative to the top-left of the visible window.
    pub fn cursor_on_screen(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row - self.scroll_offset)
    }

    // 1-based, for the status line
    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_row + 1, self.cursor_col + 1)
    }
}
