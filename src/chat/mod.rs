//! Chat sidebar state: the conversation, the input composer, the scripted
//! GFR walkthrough and the orchestrator that ties them to the backend.

pub mod composer;
pub mod demo;
pub mod orchestrator;
pub mod session;

pub use composer::ChatComposer;
pub use demo::{DemoState, ScriptedDemo};
pub use orchestrator::{ChatOrchestrator, OrchestratorOptions, Resolution, SendStatus};
pub use session::{ChatMessage, Conversation, Sender};
