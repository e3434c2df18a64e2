use serde::{Deserialize, Serialize};

use crate::definitions::{DevelopTab, PanelId};

/// What the chat sends across the response-generation boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    /// The user's message, verbatim.
    pub prompt_text: String,
    /// Multi-query research instead of a single triage call.
    #[serde(default)]
    pub deep_research: bool,
    /// Editor content, attached while the Develop panel is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorContext>,
}

impl PromptRequest {
    pub fn new(prompt_text: impl Into<String>, deep_research: bool) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            deep_research,
            editor: None,
        }
    }

    pub fn with_editor(mut self, editor: EditorContext) -> Self {
        self.editor = Some(editor);
        self
    }
}

/// The shared document as the user currently sees it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorContext {
    pub code: String,
    /// Cursor offset in characters.
    pub cursor_position: usize,
}

/// Input of the code completion step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub code_snippet: String,
    pub programming_language: String,
    pub cursor_position: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub completed_code: String,
}

/// Instruction to load code into the editor and show it in a panel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewAction {
    pub code: String,
    pub target_panel: PanelId,
    pub target_develop_tab: DevelopTab,
}

/// A successful reply from the boundary.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_action: Option<PreviewAction>,
}

impl AssistantReply {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool_suggestion = Some(tool.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_preview(mut self, action: PreviewAction) -> Self {
        self.preview_action = Some(action);
        self
    }
}

/// Why a reply could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Error,
    TimedOut,
    Cancelled,
}

/// The tagged result the chat applies to its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Success(AssistantReply),
    Failure { kind: FailureKind, reason: String },
}

impl ChatOutcome {
    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        ChatOutcome::Failure {
            kind,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_parses_camel_case_preview_action() {
        let raw = r#"{
            "text": "Here it is",
            "toolSuggestion": "GFR Calculator",
            "previewAction": {
                "code": "<p>x</p>",
                "targetPanel": "develop",
                "targetDevelopTab": "preview"
            }
        }"#;
        let reply: AssistantReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.tool_suggestion.as_deref(), Some("GFR Calculator"));
        let action = reply.preview_action.unwrap();
        assert_eq!(action.target_panel, PanelId::Develop);
        assert_eq!(action.target_develop_tab, DevelopTab::Preview);
    }

    #[test]
    fn prompt_request_omits_missing_editor() {
        let json = serde_json::to_value(PromptRequest::new("hi", false)).unwrap();
        assert_eq!(json, serde_json::json!({"promptText": "hi", "deepResearch": false}));

        let request = PromptRequest::new("hi", false).with_editor(EditorContext {
            code: "x".into(),
            cursor_position: 1,
        });
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["editor"]["cursorPosition"], 1);
    }

    #[test]
    fn unknown_panel_is_rejected() {
        let raw = r#"{"code": "", "targetPanel": "settings", "targetDevelopTab": "editor"}"#;
        assert!(serde_json::from_str::<PreviewAction>(raw).is_err());
    }
}
