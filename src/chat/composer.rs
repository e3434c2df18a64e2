/// Single-field chat input with cursor and sent-message history.
///
/// The cursor is a char index, so every edit works on whole characters.
#[derive(Clone, Debug, Default)]
pub struct ChatComposer {
    chars: Vec<char>,
    cursor: usize,
    history: Vec<String>,
    /// Position while browsing history; `None` when editing a fresh draft.
    recall: Option<usize>,
    draft: Option<Vec<char>>,
}

impl ChatComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
        self.stop_recall();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
        self.stop_recall();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        self.stop_recall();
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
            self.stop_recall();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    /// Start of the current line.
    pub fn move_home(&mut self) {
        while self.cursor > 0 && self.chars[self.cursor - 1] != '\n' {
            self.cursor -= 1;
        }
    }

    /// End of the current line.
    pub fn move_end(&mut self) {
        while self.cursor < self.chars.len() && self.chars[self.cursor] != '\n' {
            self.cursor += 1;
        }
    }

    /// Empties the input and returns what was in it, remembering non-blank
    /// entries for recall.
    pub fn take(&mut self) -> String {
        let text: String = self.chars.drain(..).collect();
        self.cursor = 0;
        self.stop_recall();
        if !text.trim().is_empty() && self.history.last() != Some(&text) {
            self.history.push(text.clone());
        }
        text
    }

    pub fn history_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.recall {
            Some(0) => 0,
            Some(index) => index - 1,
            None => {
                self.draft = Some(self.chars.clone());
                self.history.len() - 1
            }
        };
        self.load_recalled(index);
    }

    pub fn history_next(&mut self) {
        let Some(index) = self.recall else {
            return;
        };
        if index + 1 < self.history.len() {
            self.load_recalled(index + 1);
        } else {
            self.chars = self.draft.take().unwrap_or_default();
            self.cursor = self.chars.len();
            self.recall = None;
        }
    }

    /// (row, column) of the cursor within the text, in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.chars[..self.cursor];
        let row = before.iter().filter(|ch| **ch == '\n').count();
        let column = before.iter().rev().take_while(|ch| **ch != '\n').count();
        (row, column)
    }

    fn load_recalled(&mut self, index: usize) {
        self.chars = self.history[index].chars().collect();
        self.cursor = self.chars.len();
        self.recall = Some(index);
    }

    fn stop_recall(&mut self) {
        self.recall = None;
        self.draft = None;
    }
}
