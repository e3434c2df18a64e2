//! State behind the side panels: the shared editor document, its typing
//! reveal, the resizable panel layout and the sandboxed preview frame.

/// Shared editor text, develop tab and external-update flag.
pub mod document;
/// Character-by-character reveal of assistant-provided code.
pub mod animator;
/// Active panel, panel width and divider drag.
pub mod layout;
/// Sandboxed rendering of the editor document.
pub mod preview;

pub use animator::TypingAnimator;
pub use document::EditorDocument;
pub use layout::{LayoutPhase, PanelLayout};
pub use preview::PreviewFrame;
