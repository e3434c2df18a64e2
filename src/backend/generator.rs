use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;

use super::completion::{CodeCompleter, generated_code_action, is_code_request};
use super::prompts::CONVERSATIONAL_RESPONSE;
use super::research::DeepResearch;
use super::{
    AssistantReply, CompletionClient, GenerateError, PreviewAction, PromptRequest,
    ResponseGenerator, complete_json,
};
use crate::config::BackendSettings;

/// Reply fields as the model writes them. Everything is optional until
/// validated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriagePayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tool_suggestion: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub preview_action: Option<PreviewAction>,
    /// Code without a preview target; it goes to the Develop panel's preview.
    #[serde(default)]
    pub generated_code: Option<String>,
}

impl TriagePayload {
    /// Turns raw model output into a reply the chat can show.
    pub fn into_reply(self) -> Result<AssistantReply, GenerateError> {
        let preview_action = self.preview_action.or_else(|| {
            self.generated_code
                .filter(|code| !code.trim().is_empty())
                .map(generated_code_action)
        });
        let text = self.text.filter(|text| !text.trim().is_empty());
        let tool = self
            .tool_suggestion
            .filter(|tool| !tool.trim().is_empty());
        let reasoning = self.reasoning.filter(|text| !text.trim().is_empty());

        if tool.as_deref() == Some(CONVERSATIONAL_RESPONSE) {
            let Some(answer) = reasoning.or(text) else {
                return Err(GenerateError::Malformed(
                    "conversational reply without text".into(),
                ));
            };
            return Ok(AssistantReply {
                text: answer,
                tool_suggestion: None,
                reasoning: None,
                preview_action,
            });
        }

        let text = match (text, &tool) {
            (Some(text), _) => text,
            (None, Some(tool)) => {
                format!("Based on your request, I suggest the '{tool}' tool.")
            }
            (None, None) => {
                return Err(GenerateError::Malformed(
                    "reply has neither text nor a tool suggestion".into(),
                ));
            }
        };
        Ok(AssistantReply {
            text,
            tool_suggestion: tool,
            reasoning,
            preview_action,
        })
    }
}

/// Routes prompts through a model: one triage call, the research flow when
/// deep research is on, or a code completion when the user asks for code
/// while the editor is open.
pub struct TriageGenerator {
    client: Arc<dyn CompletionClient>,
    research: DeepResearch,
    completer: CodeCompleter,
    system_prompt: String,
    name: String,
}

impl TriageGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, research: DeepResearch, system_prompt: String) -> Self {
        let name = client.name().to_string();
        Self {
            completer: CodeCompleter::new(client.clone()),
            client,
            research,
            system_prompt,
            name,
        }
    }
}

#[async_trait]
impl ResponseGenerator for TriageGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: PromptRequest) -> Result<AssistantReply, GenerateError> {
        if request.deep_research {
            info!("deep research: {}", request.prompt_text);
            let report = self.research.run(&request.prompt_text).await;
            return Ok(AssistantReply::from_text(report.render()).with_tool("Deep Research"));
        }
        if let Some(editor) = request.editor.as_ref()
            && is_code_request(&request.prompt_text)
        {
            info!("code completion: {}", request.prompt_text);
            return self.completer.reply_for(&request.prompt_text, editor).await;
        }
        debug!("triage: {}", request.prompt_text);
        let payload: TriagePayload = complete_json(
            self.client.as_ref(),
            &self.system_prompt,
            &request.prompt_text,
        )
        .await?;
        payload.into_reply()
    }
}

/// Posts the prompt request JSON to a user-supplied endpoint and reads a
/// reply JSON back.
pub struct EndpointGenerator {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl EndpointGenerator {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let url = settings
            .base_url
            .clone()
            .ok_or_else(|| anyhow!("the custom backend needs backend.base_url"))?;
        Ok(Self {
            client: Client::new(),
            url,
            api_key: settings.resolved_api_key(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, GenerateError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|err| GenerateError::NotConfigured(format!("invalid api key: {err}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl ResponseGenerator for EndpointGenerator {
    fn name(&self) -> &str {
        "Custom HTTP"
    }

    async fn generate(&self, request: PromptRequest) -> Result<AssistantReply, GenerateError> {
        let response = self
            .client
            .post(&self.url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerateError::Status {
                provider: self.name().to_string(),
                status: status.as_u16(),
                body,
            });
        }
        let payload: TriagePayload =
            serde_json::from_str(&body).map_err(|err| GenerateError::Malformed(err.to_string()))?;
        payload.into_reply()
    }
}

pub const OFFLINE_REPLY: &str = "No response backend is configured, so I can only run the built-in demo and \
local tools. Set OPENAI_API_KEY or GEMINI_API_KEY, or add config/mission.toml, to enable live replies.";

/// Answers every prompt with a note that nothing is configured.
pub struct OfflineGenerator;

#[async_trait]
impl ResponseGenerator for OfflineGenerator {
    fn name(&self) -> &str {
        "Offline"
    }

    async fn generate(&self, _request: PromptRequest) -> Result<AssistantReply, GenerateError> {
        Ok(AssistantReply::from_text(OFFLINE_REPLY))
    }
}
