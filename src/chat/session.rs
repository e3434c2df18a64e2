use chrono::Local;

use crate::backend::{AssistantReply, PreviewAction};

pub const GREETING: &str = "Hello! How can I help you with your mission tools today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Ai => "Assistant",
        }
    }
}

/// One entry of the chat history. Never modified after it is pushed, except
/// for the greeting's timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    /// `HH:MM`; `None` only for the greeting until the first frame.
    pub timestamp: Option<String>,
    pub tool_suggestion: Option<String>,
    pub reasoning: Option<String>,
    pub preview_action: Option<PreviewAction>,
}

pub fn clock_label() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Append-only chat history with a selection cursor for scrolling.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
    selected: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Starts with the greeting, whose timestamp is filled in by `stamp_pending`.
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
            selected: 0,
        };
        conversation.push(Sender::Ai, GREETING.to_string(), None, AssistantReply::default());
        conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        self.push(
            Sender::User,
            text.into(),
            Some(clock_label()),
            AssistantReply::default(),
        )
    }

    pub fn push_ai_text(&mut self, text: impl Into<String>) -> u64 {
        self.push_reply(AssistantReply::from_text(text))
    }

    /// Appends an assistant message carrying the reply's extras verbatim.
    pub fn push_reply(&mut self, reply: AssistantReply) -> u64 {
        let text = reply.text.clone();
        self.push(Sender::Ai, text, Some(clock_label()), reply)
    }

    /// Fills in timestamps that were left empty. Returns how many changed.
    pub fn stamp_pending(&mut self, label: &str) -> usize {
        let mut stamped = 0;
        for message in self.messages.iter_mut().filter(|m| m.timestamp.is_none()) {
            message.timestamp = Some(label.to_string());
            stamped += 1;
        }
        stamped
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.messages.is_empty() {
            return;
        }
        let max = self.messages.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, max) as usize;
    }

    pub fn select_last(&mut self) {
        self.selected = self.messages.len().saturating_sub(1);
    }

    fn push(
        &mut self,
        sender: Sender,
        text: String,
        timestamp: Option<String>,
        extras: AssistantReply,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            text,
            timestamp,
            tool_suggestion: extras.tool_suggestion,
            reasoning: extras.reasoning,
            preview_action: extras.preview_action,
        });
        self.select_last();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_stamped_exactly_once() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].sender, Sender::Ai);
        assert_eq!(conversation.messages()[0].timestamp, None);

        assert_eq!(conversation.stamp_pending("09:30"), 1);
        assert_eq!(conversation.stamp_pending("09:31"), 0);
        assert_eq!(conversation.messages()[0].timestamp.as_deref(), Some("09:30"));
    }

    #[test]
    fn ids_increase_and_selection_follows_tail() {
        let mut conversation = Conversation::new();
        let user = conversation.push_user("hi");
        let ai = conversation.push_reply(
            AssistantReply::from_text("hello")
                .with_tool("GFR Calculator")
                .with_reasoning("kidney"),
        );
        assert!(ai > user);
        assert_eq!(conversation.selected_index(), 2);
        let last = conversation.last().unwrap();
        assert_eq!(last.tool_suggestion.as_deref(), Some("GFR Calculator"));
        assert_eq!(last.reasoning.as_deref(), Some("kidney"));
        assert!(last.timestamp.is_some());

        conversation.move_selection(-10);
        assert_eq!(conversation.selected_index(), 0);
        conversation.move_selection(10);
        assert_eq!(conversation.selected_index(), 2);
    }
}
