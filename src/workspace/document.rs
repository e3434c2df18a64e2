use ropey::Rope;

use crate::definitions::DevelopTab;

/// Placeholder page shown in the Develop panel before any assistant code arrives.
pub const DEFAULT_DOCUMENT: &str = "<!DOCTYPE html>
<html>
<head>
    <title>IDE Preview</title>
</head>
<body>
    <h1>Welcome to the IDE</h1>
    <p>Code from AI will appear here.</p>
</body>
</html>
";

/// Session-wide editor state shared by the Develop panel, the preview frame
/// and the typing animator.
///
/// Every text change bumps `revision`. Changes made through the editing
/// operations count as user typing and clear `is_external_update`;
/// `load_external` sets it.
#[derive(Debug, Clone)]
pub struct EditorDocument {
    text: Rope,
    active_tab: DevelopTab,
    is_external_update: bool,
    /// Cursor position as a char index into `text`.
    cursor: usize,
    /// Column remembered across vertical moves.
    preferred_column: Option<usize>,
    revision: u64,
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorDocument {
    /// The startup document. It is flagged as external so the animator
    /// reveals the placeholder on the first frames.
    pub fn new() -> Self {
        Self {
            text: Rope::from_str(DEFAULT_DOCUMENT),
            active_tab: DevelopTab::Editor,
            is_external_update: true,
            cursor: 0,
            preferred_column: None,
            revision: 1,
        }
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_external_update(&self) -> bool {
        self.is_external_update
    }

    /// Changes only the flag; the revision stays put so observers do not
    /// treat it as new text.
    pub fn set_external_update(&mut self, value: bool) {
        self.is_external_update = value;
    }

    pub fn active_tab(&self) -> DevelopTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: DevelopTab) {
        self.active_tab = tab;
    }

    pub fn cycle_tab(&mut self) -> DevelopTab {
        self.active_tab = self.active_tab.next();
        self.active_tab
    }

    /// Replaces the whole text as if the user typed it.
    pub fn set_text(&mut self, value: &str) {
        self.text = Rope::from_str(value);
        self.cursor = self.cursor.min(self.text.len_chars());
        self.preferred_column = None;
        self.mark_user_edit();
    }

    /// Replaces the whole text on behalf of the assistant. Text and flag are
    /// updated together.
    pub fn load_external(&mut self, value: &str) {
        self.text = Rope::from_str(value);
        self.cursor = 0;
        self.preferred_column = None;
        self.is_external_update = true;
        self.revision += 1;
    }

    /// Cursor as a char index into the text.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as (line, column), both zero based.
    pub fn cursor_position(&self) -> (usize, usize) {
        let line = self.text.char_to_line(self.cursor);
        let column = self.cursor - self.text.line_to_char(line);
        (line, column)
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert_char(self.cursor, ch);
        self.cursor += 1;
        self.preferred_column = None;
        self.mark_user_edit();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.text.remove(self.cursor - 1..self.cursor);
        self.cursor -= 1;
        self.preferred_column = None;
        self.mark_user_edit();
    }

    pub fn delete_forward(&mut self) {
        if self.cursor >= self.text.len_chars() {
            return;
        }
        self.text.remove(self.cursor..self.cursor + 1);
        self.preferred_column = None;
        self.mark_user_edit();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.preferred_column = None;
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len_chars() {
            self.cursor += 1;
        }
        self.preferred_column = None;
    }

    pub fn move_up(&mut self) {
        let (line, column) = self.cursor_position();
        if line == 0 {
            return;
        }
        self.move_to_line(line - 1, column);
    }

    pub fn move_down(&mut self) {
        let (line, column) = self.cursor_position();
        if line + 1 >= self.text.len_lines() {
            return;
        }
        self.move_to_line(line + 1, column);
    }

    pub fn move_line_start(&mut self) {
        let (line, _) = self.cursor_position();
        self.cursor = self.text.line_to_char(line);
        self.preferred_column = None;
    }

    pub fn move_line_end(&mut self) {
        let (line, _) = self.cursor_position();
        self.cursor = self.text.line_to_char(line) + self.line_len(line);
        self.preferred_column = None;
    }

    fn move_to_line(&mut self, target: usize, column: usize) {
        let wanted = *self.preferred_column.get_or_insert(column);
        let column = wanted.min(self.line_len(target));
        self.cursor = self.text.line_to_char(target) + column;
    }

    /// Length of a line in chars, excluding its line break.
    fn line_len(&self, line: usize) -> usize {
        let slice = self.text.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    fn mark_user_edit(&mut self) {
        self.is_external_update = false;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_placeholder_flagged_external() {
        let doc = EditorDocument::new();
        assert_eq!(doc.text(), DEFAULT_DOCUMENT);
        assert!(doc.is_external_update());
        assert_eq!(doc.active_tab(), DevelopTab::Editor);
    }

    #[test]
    fn user_text_round_trips_and_clears_flag() {
        let mut doc = EditorDocument::new();
        let before = doc.revision();
        doc.set_text("<p>hi</p>");
        assert_eq!(doc.text(), "<p>hi</p>");
        assert!(!doc.is_external_update());
        assert!(doc.revision() > before);
    }

    #[test]
    fn external_load_sets_text_and_flag_together() {
        let mut doc = EditorDocument::new();
        doc.set_text("draft");
        doc.load_external("<html></html>");
        assert_eq!(doc.text(), "<html></html>");
        assert!(doc.is_external_update());
        assert_eq!(doc.cursor_position(), (0, 0));
    }

    #[test]
    fn flag_toggle_does_not_bump_revision() {
        let mut doc = EditorDocument::new();
        let revision = doc.revision();
        doc.set_external_update(false);
        assert_eq!(doc.revision(), revision);
        assert!(!doc.is_external_update());
    }

    #[test]
    fn keystrokes_edit_at_cursor() {
        let mut doc = EditorDocument::new();
        doc.set_text("");
        for ch in "ab".chars() {
            doc.insert_char(ch);
        }
        doc.insert_newline();
        doc.insert_char('c');
        assert_eq!(doc.text(), "ab\nc");
        assert_eq!(doc.cursor_position(), (1, 1));

        doc.move_up();
        assert_eq!(doc.cursor_position(), (0, 1));
        doc.delete_forward();
        assert_eq!(doc.text(), "a\nc");
        doc.backspace();
        assert_eq!(doc.text(), "\nc");
        doc.backspace();
        assert_eq!(doc.text(), "\nc");
    }

    #[test]
    fn vertical_moves_keep_preferred_column() {
        let mut doc = EditorDocument::new();
        doc.set_text("abcdef\nx\nabcdef");
        doc.move_line_end();
        assert_eq!(doc.cursor_position(), (0, 6));
        doc.move_down();
        assert_eq!(doc.cursor_position(), (1, 1));
        doc.move_down();
        assert_eq!(doc.cursor_position(), (2, 6));
        doc.move_line_start();
        assert_eq!(doc.cursor_position(), (2, 0));
    }

    #[test]
    fn editing_after_external_load_counts_as_typing() {
        let mut doc = EditorDocument::new();
        doc.load_external("abc");
        doc.move_line_end();
        doc.insert_char('d');
        assert_eq!(doc.text(), "abcd");
        assert!(!doc.is_external_update());
    }

    #[test]
    fn cycle_tab_wraps() {
        let mut doc = EditorDocument::new();
        assert_eq!(doc.cycle_tab(), DevelopTab::Preview);
        assert_eq!(doc.cycle_tab(), DevelopTab::Terminal);
        assert_eq!(doc.cycle_tab(), DevelopTab::Editor);
    }
}
