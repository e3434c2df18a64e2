use super::document::EditorDocument;

/// Reveals externally loaded text one character per tick.
///
/// The animator keeps its own `displayed` copy of the document. User edits
/// replace it at once; assistant loads restart the reveal from an empty
/// string.
#[derive(Debug, Default, Clone)]
pub struct TypingAnimator {
    displayed: String,
    target: String,
    /// Byte offset into `target` already copied into `displayed`.
    revealed: usize,
    revealing: bool,
    seen_revision: Option<u64>,
}

impl TypingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    /// Chars revealed so far and the total to reveal.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.target[..self.revealed].chars().count(),
            self.target.chars().count(),
        )
    }

    /// Catches up with the document after a text change.
    pub fn sync(&mut self, doc: &mut EditorDocument) {
        if self.seen_revision == Some(doc.revision()) {
            return;
        }
        self.seen_revision = Some(doc.revision());
        let text = doc.text();

        if !doc.is_external_update() {
            self.displayed = text;
            self.cancel();
            return;
        }

        if !self.revealing && self.displayed == text {
            doc.set_external_update(false);
            return;
        }

        self.displayed.clear();
        self.target = text;
        self.revealed = 0;
        self.revealing = true;
        if self.target.is_empty() {
            self.finish(doc);
        }
    }

    /// Advances the reveal by one character. Returns whether anything changed.
    pub fn tick(&mut self, doc: &mut EditorDocument) -> bool {
        self.sync(doc);
        if !self.revealing {
            return false;
        }
        let Some(ch) = self.target[self.revealed..].chars().next() else {
            self.finish(doc);
            return false;
        };
        self.displayed.push(ch);
        self.revealed += ch.len_utf8();
        if self.revealed >= self.target.len() {
            self.finish(doc);
        }
        true
    }

    fn finish(&mut self, doc: &mut EditorDocument) {
        self.cancel();
        doc.set_external_update(false);
    }

    fn cancel(&mut self) {
        self.revealing = false;
        self.target.clear();
        self.revealed = 0;
    }
}
