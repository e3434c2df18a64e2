use std::sync::Arc;

use log::debug;

use super::prompts::completion_prompt;
use super::{
    AssistantReply, CompletionClient, CompletionRequest, CompletionResponse, EditorContext,
    GenerateError, PreviewAction, complete_json,
};
use crate::definitions::{DevelopTab, PanelId};

pub const CODE_HELPER_TOOL: &str = "Code Editor Helper";

const CODE_KEYWORDS: &[&str] = &["code", "write", "function", "implement"];

const COMPLETION_REPLY: &str = "Here's some code based on your request. It is loaded in the \
editor, and the Preview tab shows what it does.";

/// Whether a chat message asks for code to be written.
pub fn is_code_request(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase();
    CODE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Markup unless the document clearly starts with something else. Empty
/// documents count as markup since the preview renders HTML.
pub fn detect_language(code: &str) -> &'static str {
    let trimmed = code.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        "html"
    } else {
        "javascript"
    }
}

/// Code that goes straight into the editor and is shown in the preview.
pub fn generated_code_action(code: String) -> PreviewAction {
    PreviewAction {
        code,
        target_panel: PanelId::Develop,
        target_develop_tab: DevelopTab::Preview,
    }
}

/// Completes the editor document through a model.
pub struct CodeCompleter {
    client: Arc<dyn CompletionClient>,
}

impl CodeCompleter {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn complete(
        &self,
        instruction: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GenerateError> {
        let (system, user) = completion_prompt(instruction, request);
        let response: CompletionResponse =
            complete_json(self.client.as_ref(), &system, &user).await?;
        if response.completed_code.trim().is_empty() {
            return Err(GenerateError::Malformed("completion without code".into()));
        }
        Ok(response)
    }

    /// Answers a chat request by completing the current editor content.
    pub async fn reply_for(
        &self,
        prompt: &str,
        editor: &EditorContext,
    ) -> Result<AssistantReply, GenerateError> {
        let request = CompletionRequest {
            code_snippet: editor.code.clone(),
            programming_language: detect_language(&editor.code).to_string(),
            cursor_position: editor.cursor_position,
        };
        debug!(
            "completing {} chars of {} at {}",
            request.code_snippet.chars().count(),
            request.programming_language,
            request.cursor_position
        );
        let response = self.complete(prompt, &request).await?;
        Ok(AssistantReply::from_text(COMPLETION_REPLY)
            .with_tool(CODE_HELPER_TOOL)
            .with_preview(generated_code_action(response.completed_code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::generator::tests::ScriptedClient;

    fn editor() -> EditorContext {
        EditorContext {
            code: "<h1>Title</h1>\n".into(),
            cursor_position: 14,
        }
    }

    #[test]
    fn code_requests_are_recognised() {
        assert!(is_code_request("Write a footer"));
        assert!(is_code_request("implement a dose table"));
        assert!(is_code_request("add a FUNCTION for bmi"));
        assert!(!is_code_request("what is ckd stage 3?"));
    }

    #[test]
    fn language_follows_document_start() {
        assert_eq!(detect_language("  <div></div>"), "html");
        assert_eq!(detect_language(""), "html");
        assert_eq!(detect_language("const x = 1;"), "javascript");
    }

    #[tokio::test]
    async fn completion_loads_code_into_preview() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(
            r#"{"completedCode": "<h1>Title</h1>\n<footer>ok</footer>"}"#.into(),
        )]));
        let completer = CodeCompleter::new(client.clone());
        let reply = completer.reply_for("write a footer", &editor()).await.unwrap();

        assert_eq!(reply.tool_suggestion.as_deref(), Some(CODE_HELPER_TOOL));
        let action = reply.preview_action.unwrap();
        assert_eq!(action.code, "<h1>Title</h1>\n<footer>ok</footer>");
        assert_eq!(action.target_panel, PanelId::Develop);
        assert_eq!(action.target_develop_tab, DevelopTab::Preview);

        let prompts = client.prompts.lock().unwrap();
        let (_, user) = &prompts[0];
        assert!(user.contains("write a footer"));
        assert!(user.contains("Programming Language: html"));
        assert!(user.contains("Cursor Position: 14"));
        assert!(user.contains("<h1>Title</h1>"));
    }

    #[tokio::test]
    async fn empty_completion_is_malformed() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(r#"{"completedCode": "  "}"#.into())]));
        let err = CodeCompleter::new(client)
            .reply_for("write code", &editor())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }
}
