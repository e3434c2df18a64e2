use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::AbortHandle;

use super::demo::{DemoState, DemoStep, ScriptedDemo};
use super::session::Conversation;
use crate::backend::{
    AssistantReply, ChatOutcome, EditorContext, FailureKind, GenerateError, PreviewAction,
    PromptRequest, ResponseGenerator,
};
use crate::config::Settings;
use crate::tools::ToolRegistry;

pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error trying to process your request.";
pub const TIMEOUT_MESSAGE: &str =
    "Sorry, the request took too long and was stopped. Please try again.";
pub const CANCELLED_MESSAGE: &str = "Request cancelled.";

const TOOL_COMMAND: &str = "/tool";
const TOOL_USAGE: &str =
    "Usage: /tool <name> <json input>. Open the Tools panel (F4) to see what is available.";

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub demo_enabled: bool,
    pub demo_latency: Duration,
    pub triage_timeout: Duration,
    pub research_timeout: Duration,
}

impl OrchestratorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            demo_enabled: settings.demo.enabled,
            demo_latency: Duration::from_millis(settings.demo.latency_ms),
            triage_timeout: settings.backend.timeout(),
            research_timeout: settings.research.timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Sent,
    /// A reply is still outstanding; nothing was appended.
    Busy,
    /// Blank input; nothing was appended.
    Empty,
}

/// What a finished request left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub message_id: u64,
    pub preview_action: Option<PreviewAction>,
    pub failure: Option<FailureKind>,
}

struct PendingReply {
    receiver: oneshot::Receiver<ChatOutcome>,
    abort: AbortHandle,
    label: &'static str,
    /// Script state to move to once a scripted reply is delivered.
    demo_next: Option<DemoState>,
}

/// Sends chat input to the scripted demo, a lookup tool or the response
/// generator, one request at a time, and records the outcome in the
/// conversation.
pub struct ChatOrchestrator {
    conversation: Conversation,
    generator: Arc<dyn ResponseGenerator>,
    tools: Arc<ToolRegistry>,
    demo: ScriptedDemo,
    options: OrchestratorOptions,
    deep_research: bool,
    pending: Option<PendingReply>,
}

impl ChatOrchestrator {
    pub fn new(
        generator: Arc<dyn ResponseGenerator>,
        tools: Arc<ToolRegistry>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            conversation: Conversation::new(),
            generator,
            tools,
            demo: ScriptedDemo::new(),
            options,
            deep_research: false,
            pending: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deep_research(&self) -> bool {
        self.deep_research
    }

    pub fn toggle_deep_research(&mut self) -> bool {
        self.deep_research = !self.deep_research;
        self.deep_research
    }

    pub fn demo_state(&self) -> DemoState {
        self.demo.state()
    }

    /// Appends the user's message and starts exactly one reply path.
    pub fn send(&mut self, text: &str) -> SendStatus {
        self.send_with_editor(text, None)
    }

    /// Like `send`, with the editor's content attached so the generator can
    /// answer code requests by completing it.
    pub fn send_with_editor(&mut self, text: &str, editor: Option<EditorContext>) -> SendStatus {
        if self.is_loading() {
            debug!("send ignored while a reply is pending");
            return SendStatus::Busy;
        }
        let prompt = text.trim();
        if prompt.is_empty() {
            return SendStatus::Empty;
        }
        self.conversation.push_user(prompt);

        if let Some(rest) = tool_command(prompt) {
            self.start_tool(rest);
            return SendStatus::Sent;
        }

        if self.options.demo_enabled
            && let Some(DemoStep { reply, next }) = self.demo.step_for(prompt)
        {
            let latency = self.options.demo_latency;
            self.spawn("demo", self.options.triage_timeout, Some(next), async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Ok(reply)
            });
            return SendStatus::Sent;
        }

        let mut request = PromptRequest::new(prompt, self.deep_research);
        if let Some(editor) = editor {
            request = request.with_editor(editor);
        }
        let (label, limit) = if request.deep_research {
            ("research", self.options.research_timeout)
        } else {
            ("triage", self.options.triage_timeout)
        };
        info!("sending {label} request to {}", self.generator.name());
        let generator = self.generator.clone();
        self.spawn(label, limit, None, async move { generator.generate(request).await });
        SendStatus::Sent
    }

    /// Non-blocking check for a finished reply.
    pub fn poll(&mut self) -> Option<Resolution> {
        let pending = self.pending.as_mut()?;
        let outcome = match pending.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => lost_task(),
        };
        let demo_next = pending.demo_next;
        self.pending = None;
        Some(self.apply(outcome, demo_next))
    }

    /// Waits for the outstanding reply, if any.
    pub async fn resolve(&mut self) -> Option<Resolution> {
        let pending = self.pending.take()?;
        let outcome = pending.receiver.await.unwrap_or_else(|_| lost_task());
        Some(self.apply(outcome, pending.demo_next))
    }

    /// Aborts the outstanding reply. Returns false when nothing was pending.
    pub fn cancel(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        pending.abort.abort();
        self.apply(
            ChatOutcome::failure(
                FailureKind::Cancelled,
                format!("{} request cancelled by the user", pending.label),
            ),
            None,
        );
        true
    }

    fn start_tool(&mut self, command: &str) {
        let (name, raw_input) = match command.split_once(char::is_whitespace) {
            Some((name, input)) => (name, input.trim()),
            None => (command, ""),
        };
        if name.is_empty() {
            self.conversation.push_ai_text(TOOL_USAGE);
            return;
        }
        let input = if raw_input.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str::<Value>(raw_input) {
                Ok(value) => value,
                Err(err) => {
                    self.conversation
                        .push_ai_text(format!("Invalid JSON input for `{name}`: {err}"));
                    return;
                }
            }
        };
        let tools = self.tools.clone();
        let name = name.to_string();
        self.spawn("tool", self.options.triage_timeout, None, async move {
            let output = tools.invoke(&name, input).await;
            let text = serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string());
            Ok(AssistantReply::from_text(text).with_tool(name))
        });
    }

    fn spawn<F>(
        &mut self,
        label: &'static str,
        limit: Duration,
        demo_next: Option<DemoState>,
        work: F,
    ) where
        F: Future<Output = Result<AssistantReply, GenerateError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(limit, work).await {
                Ok(Ok(reply)) => ChatOutcome::Success(reply),
                Ok(Err(err)) => ChatOutcome::failure(FailureKind::Error, err.to_string()),
                Err(_) => ChatOutcome::failure(
                    FailureKind::TimedOut,
                    GenerateError::Timeout(limit).to_string(),
                ),
            };
            let _ = tx.send(outcome);
        });
        self.pending = Some(PendingReply {
            receiver: rx,
            abort: handle.abort_handle(),
            label,
            demo_next,
        });
    }

    /// Records the outcome. The scripted demo only moves on when its reply
    /// actually landed.
    fn apply(&mut self, outcome: ChatOutcome, demo_next: Option<DemoState>) -> Resolution {
        match outcome {
            ChatOutcome::Success(reply) => {
                if let Some(next) = demo_next {
                    self.demo.advance(next);
                }
                let preview_action = reply.preview_action.clone();
                let message_id = self.conversation.push_reply(reply);
                Resolution {
                    message_id,
                    preview_action,
                    failure: None,
                }
            }
            ChatOutcome::Failure { kind, reason } => {
                let text = match kind {
                    FailureKind::Error => {
                        error!("reply failed: {reason}");
                        GENERIC_ERROR_MESSAGE
                    }
                    FailureKind::TimedOut => {
                        error!("reply timed out: {reason}");
                        TIMEOUT_MESSAGE
                    }
                    FailureKind::Cancelled => {
                        warn!("{reason}");
                        CANCELLED_MESSAGE
                    }
                };
                let message_id = self.conversation.push_ai_text(text);
                Resolution {
                    message_id,
                    preview_action: None,
                    failure: Some(kind),
                }
            }
        }
    }
}

fn tool_command(prompt: &str) -> Option<&str> {
    let rest = prompt.strip_prefix(TOOL_COMMAND)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn lost_task() -> ChatOutcome {
    ChatOutcome::failure(FailureKind::Error, "reply task ended without a result")
}
