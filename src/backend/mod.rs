//! The response-generation boundary: prompt requests go in, assistant
//! replies or errors come out.
//!
//! `ResponseGenerator` is what the chat talks to. `CompletionClient` is the
//! lower-level "system prompt + user prompt in, text out" seam that the
//! HTTP providers implement and the generators build on.

/// Prompt, reply and outcome payloads.
pub mod message;
/// HTTP model providers.
pub mod http;
/// Triage, endpoint and offline generators.
pub mod generator;
/// Code completion over the editor document.
pub mod completion;
/// Multi-query web research.
pub mod research;
/// Instructions sent to the model.
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::{Provider, Settings};
use crate::tools::ToolRegistry;

pub use message::{
    AssistantReply, ChatOutcome, CompletionRequest, CompletionResponse, EditorContext,
    FailureKind, PreviewAction, PromptRequest,
};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("backend is not configured: {0}")]
    NotConfigured(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Anything that can answer a chat prompt.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Name shown in the status bar and logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: PromptRequest) -> Result<AssistantReply, GenerateError>;
}

/// A single-turn text completion from a model provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerateError>;
}

/// Asks for a completion and parses the JSON object inside it.
pub async fn complete_json<T: DeserializeOwned>(
    client: &dyn CompletionClient,
    system: &str,
    user: &str,
) -> Result<T, GenerateError> {
    let raw = client.complete(system, user).await?;
    parse_json_payload(&raw)
}

/// Models wrap JSON in prose or code fences often enough that the outermost
/// object is extracted before parsing.
pub fn parse_json_payload<T: DeserializeOwned>(raw: &str) -> Result<T, GenerateError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(GenerateError::Malformed(format!(
                "no JSON object in model output: {}",
                preview(raw)
            )));
        }
    };
    serde_json::from_str(candidate)
        .map_err(|err| GenerateError::Malformed(format!("{err}: {}", preview(candidate))))
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 160;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Builds the generator described by the settings.
pub fn build_generator(
    settings: &Settings,
    tools: Arc<ToolRegistry>,
) -> Result<Arc<dyn ResponseGenerator>> {
    let backend = &settings.backend;
    let generator: Arc<dyn ResponseGenerator> = match backend.provider {
        Provider::Offline => Arc::new(generator::OfflineGenerator),
        Provider::Custom => Arc::new(generator::EndpointGenerator::new(backend)?),
        Provider::OpenAi | Provider::Gemini | Provider::Ollama => {
            let client: Arc<dyn CompletionClient> = Arc::new(http::HttpCompletion::new(backend)?);
            let system_prompt =
                prompts::triage_system_prompt(backend.system_prompt.as_deref(), tools.specs());
            let research = research::DeepResearch::new(
                client.clone(),
                Arc::new(research::RegistryResearchTools::new(tools)),
                settings.research.max_sub_queries,
            );
            Arc::new(generator::TriageGenerator::new(client, research, system_prompt))
        }
    };
    info!("response generator: {}", generator.name());
    Ok(generator)
}
