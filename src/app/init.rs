use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};

use super::{App, FocusArea};
use crate::backend::generator::OfflineGenerator;
use crate::backend::{ResponseGenerator, build_generator};
use crate::chat::{ChatComposer, ChatOrchestrator, OrchestratorOptions};
use crate::config::Settings;
use crate::definitions::HitRegistry;
use crate::tools::ToolRegistry;
use crate::tools::search::BraveSearch;
use crate::workspace::{EditorDocument, PanelLayout, PreviewFrame, TypingAnimator};

const WELCOME_STATUS: &str = "F2 Browser · F3 Develop · F4 Tools · F6 switch focus · Ctrl+Q quit";

impl App {
    /// Creates the application state for `workspace_root`.
    ///
    /// A backend that cannot be built (missing key, unknown endpoint) is
    /// reported in the control bar and replaced by the offline generator, so
    /// the session always starts.
    pub fn new(workspace_root: PathBuf, settings: Settings) -> Result<Self> {
        let canonical_root = workspace_root.canonicalize().unwrap_or(workspace_root);
        debug!("Initializing App with workspace: {}", canonical_root.display());

        let tools = Arc::new(ToolRegistry::new(BraveSearch::new(&settings.search)));
        let (generator, status): (Arc<dyn ResponseGenerator>, _) =
            match build_generator(&settings, tools.clone()) {
                Ok(generator) => (generator, WELCOME_STATUS.to_string()),
                Err(err) => {
                    warn!("falling back to offline replies: {err:#}");
                    (Arc::new(OfflineGenerator), format!("Backend unavailable: {err}"))
                }
            };

        let mut app = Self::with_generator(canonical_root, settings, generator, tools);
        app.status_message = status;
        Ok(app)
    }

    /// Builds the state around an already constructed generator.
    pub fn with_generator(
        workspace_root: PathBuf,
        settings: Settings,
        generator: Arc<dyn ResponseGenerator>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let chat = ChatOrchestrator::new(
            generator,
            tools,
            OrchestratorOptions::from_settings(&settings),
        );
        let mut app = Self {
            should_quit: false,
            focus: FocusArea::Chat,
            document: EditorDocument::new(),
            animator: TypingAnimator::new(),
            preview: PreviewFrame::new(),
            layout: PanelLayout::new(settings.ui.default_panel_width),
            chat,
            composer: ChatComposer::new(),
            status_message: WELCOME_STATUS.to_string(),
            workspace_root,
            settings,
            hits: HitRegistry::default(),
            tool_selected: 0,
            editor_scroll: 0,
            preview_scroll: 0,
            first_frame_drawn: false,
            ticks: 0,
            tick_rate: Duration::from_millis(250),
        };
        // The placeholder document starts as an external update, so it is
        // revealed like any pushed code.
        app.refresh_document_views();
        app
    }
}
