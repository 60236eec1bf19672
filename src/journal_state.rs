use crate::journal_entry::JournalEntry;

/// Everything the journal page shows. Rebuilt from server data, never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JournalState {
    entries: Vec<JournalEntry>,
    reply: Option<String>,
    input: String,
    // byte offset into `input`, always on a char boundary
    cursor: usize,
    // highlighted card, kept inside the list
    selected: usize,
}

impl JournalState {
    pub fn new() -> Self {
        JournalState::default()
    }

    pub fn get_entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Drops whatever was shown and installs `entries` in the order given.
    pub fn replace_entries(&mut self, entries: Vec<JournalEntry>) {
        self.entries = entries;
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }

    /// Index of the highlighted card, `None` for an empty list.
    pub fn selected_entry(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn scroll_up(&mut self, by: usize) {
        self.selected = self.selected.saturating_sub(by);
    }

    pub fn scroll_down(&mut self, by: usize) {
        let last = self.entries.len().saturating_sub(1);
        self.selected = (self.selected + by).min(last);
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    pub fn show_reply(&mut self, text: String) {
        self.reply = Some(text);
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text to send, or `None` when the input is empty.
    pub fn take_submission(&self) -> Option<String> {
        if self.input.is_empty() {
            None
        } else {
            Some(self.input.clone())
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.input.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.input[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.input[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.input.len());
    }
}
