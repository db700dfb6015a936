//! Multi-line text buffer backing the editor pane.

use unicode_width::UnicodeWidthStr;

use crate::utils::unicode::char_to_byte_index;

const TAB_WIDTH: usize = 4;

/// Cursor edits the reducer forwards to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Insert(char),
    InsertText(String),
    Newline,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Lines of text plus a cursor; the column is a char index, not a byte index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    lines: Vec<String>,
    row: usize,
    col: usize,
    /// First visible line, maintained by the renderer.
    pub scroll: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self { lines: vec![String::new()], row: 0, col: 0, scroll: 0 }
    }
}

impl Editor {
    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::default();
        editor.set_text(text);
        editor
    }

    /// Replace the whole buffer and park the cursor at the start.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = 0;
        self.col = 0;
        self.scroll = 0;
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Terminal column of the cursor on its line.
    pub fn cursor_display_col(&self) -> usize {
        let line = &self.lines[self.row];
        let byte = char_to_byte_index(line, self.col);
        line[..byte].width()
    }

    pub fn apply(&mut self, action: EditorAction) {
        match action {
            EditorAction::Insert(c) => self.insert_char(c),
            EditorAction::InsertText(text) => self.insert_text(&text),
            EditorAction::Newline => self.newline(),
            EditorAction::Tab => {
                for _ in 0..TAB_WIDTH {
                    self.insert_char(' ');
                }
            }
            EditorAction::Backspace => self.backspace(),
            EditorAction::Delete => self.delete(),
            EditorAction::Left => self.move_left(),
            EditorAction::Right => self.move_right(),
            EditorAction::Up => self.move_vertical(-1),
            EditorAction::Down => self.move_vertical(1),
            EditorAction::Home => self.col = 0,
            EditorAction::End => self.col = self.line_len(self.row),
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }
        let line = &mut self.lines[self.row];
        let byte = char_to_byte_index(line, self.col);
        line.insert(byte, c);
        self.col += 1;
    }

    fn insert_text(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for c in normalized.chars() {
            if c == '\t' {
                self.apply(EditorAction::Tab);
            } else {
                self.insert_char(c);
            }
        }
    }

    fn newline(&mut self) {
        let line = &mut self.lines[self.row];
        let byte = char_to_byte_index(line, self.col);
        let rest = line.split_off(byte);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let byte = char_to_byte_index(line, self.col - 1);
            line.remove(byte);
            self.col -= 1;
        } else if self.row > 0 {
            // Join with the previous line
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&current);
        }
    }

    fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let line = &mut self.lines[self.row];
            let byte = char_to_byte_index(line, self.col);
            line.remove(byte);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let target = self.row as isize + delta;
        if target < 0 || target as usize >= self.lines.len() {
            return;
        }
        self.row = target as usize;
        self.col = self.col.min(self.line_len(self.row));
    }

    /// Keep the cursor row inside a viewport of `height` lines.
    pub fn scroll_into_view(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        }
    }
}
