//! Multi-line text buffer backing the code input area.

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

const TAB_WIDTH: usize = 4;

#[derive(Debug, Default, Clone)]
pub struct CodeBuffer {
    text: String,
    cursor: usize, // char index into text
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        // Normalise pasted CRLF so the cursor math stays in chars of the stored text
        let s = s.replace("\r\n", "\n").replace('\r', "\n");
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(byte_pos, &s);
        self.cursor += s.chars().count();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Tab inserts spaces up to the next tab stop
    pub fn insert_tab(&mut self) {
        let (_, col) = self.cursor_position();
        let spaces = TAB_WIDTH - (col % TAB_WIDTH);
        self.insert_str(&" ".repeat(spaces));
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = self.line_start(row);
    }

    pub fn move_end(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = self.line_start(row) + self.line_len(row);
    }

    pub fn move_up(&mut self) {
        let (row, col) = self.cursor_position();
        if row > 0 {
            self.cursor = self.line_start(row - 1) + col.min(self.line_len(row - 1));
        }
    }

    pub fn move_down(&mut self) {
        let (row, col) = self.cursor_position();
        if row + 1 < self.line_count() {
            self.cursor = self.line_start(row + 1) + col.min(self.line_len(row + 1));
        }
    }

    /// (row, column) of the cursor, both counted in chars
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut row = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }

    /// Lines with their byte offset in the text. A trailing newline yields a
    /// final empty line so the cursor has somewhere to sit.
    pub fn lines_with_offsets(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::new();
        let mut start = 0;
        for (idx, c) in self.text.char_indices() {
            if c == '\n' {
                out.push((start, &self.text[start..idx]));
                start = idx + 1;
            }
        }
        out.push((start, &self.text[start..]));
        out
    }

    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    fn line_len(&self, row: usize) -> usize {
        self.text.split('\n').nth(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn line_start(&self, row: usize) -> usize {
        self.text
            .split('\n')
            .take(row)
            .map(|l| l.chars().count() + 1)
            .sum()
    }
}
