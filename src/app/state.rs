//! Defines the core state structures for the application.
//!
//! `App` owns every piece of session state: the shared editor document and
//! its typing animator, the side panel layout, the preview frame and the chat
//! orchestrator. Nothing is global; handlers borrow what they need from here.

use std::path::PathBuf;
use std::time::Duration;

use crate::chat::{ChatComposer, ChatOrchestrator};
use crate::config::Settings;
use crate::definitions::{FocusArea, HitRegistry, PanelId};
use crate::workspace::{EditorDocument, PanelLayout, PreviewFrame, TypingAnimator};

/// The main application state.
pub struct App {
    // --- Core State ---
    /// Flag to indicate if the application should quit.
    pub should_quit: bool,
    /// The half of the screen receiving keyboard input.
    pub focus: FocusArea,
    /// Editor text, develop sub-tab and the external-update flag.
    pub document: EditorDocument,
    /// Reveals externally pushed text one character per frame.
    pub animator: TypingAnimator,
    /// Sandboxed rendering of the document for the Preview tab.
    pub preview: PreviewFrame,
    /// Which side panel is open and how wide it is.
    pub layout: PanelLayout,
    /// Conversation plus the request currently in flight.
    pub chat: ChatOrchestrator,
    /// The chat input box.
    pub composer: ChatComposer,

    // --- UI ---
    /// The message currently displayed in the control bar.
    pub status_message: String,
    /// The root directory exports and logs are written under.
    pub workspace_root: PathBuf,
    pub settings: Settings,
    /// Clickable regions from the last drawn frame.
    pub hits: HitRegistry,
    /// Highlighted row of the Tools panel.
    pub tool_selected: usize,
    /// First visible line of the editor tab.
    pub(crate) editor_scroll: usize,
    /// First visible line of the preview tab.
    pub(crate) preview_scroll: usize,

    // --- Internal State & Flags ---
    /// Set once the first frame has been drawn and the greeting stamped.
    pub(crate) first_frame_drawn: bool,
    /// Counts housekeeping ticks; drives the loading spinner.
    pub(crate) ticks: u64,
    pub(crate) tick_rate: Duration,
}

/// Everything a key binding or mouse click can trigger outside text editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    TogglePanel(PanelId),
    ClosePanel,
    CycleDevelopTab,
    CycleFocus,
    ToggleDeepResearch,
    WidenPanel,
    NarrowPanel,
    ExportPreview,
    CancelRequest,
    Quit,
}
