use log::{debug, error, info};

use super::{App, CommandAction, FocusArea, PanelId};
use crate::backend::{EditorContext, FailureKind, PreviewAction};
use crate::chat::{Resolution, SendStatus};
use crate::workspace::layout::KEYBOARD_RESIZE_STEP_PERCENT;

impl App {
    /// The single source of truth for executing a `CommandAction`.
    pub(crate) fn execute_action(&mut self, action: CommandAction) {
        debug!("Executing action {:?}", action);
        match action {
            CommandAction::TogglePanel(panel) => self.toggle_panel(panel),
            CommandAction::ClosePanel => self.close_panel(),
            CommandAction::CycleDevelopTab => {
                let tab = self.document.cycle_tab();
                self.layout.show_panel(PanelId::Develop);
                self.status_message = format!("Develop tab: {}", tab.label());
            }
            CommandAction::CycleFocus => self.cycle_focus(),
            CommandAction::ToggleDeepResearch => {
                let enabled = self.chat.toggle_deep_research();
                self.status_message = format!(
                    "Deep research {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            CommandAction::WidenPanel => self.nudge_panel(KEYBOARD_RESIZE_STEP_PERCENT),
            CommandAction::NarrowPanel => self.nudge_panel(-KEYBOARD_RESIZE_STEP_PERCENT),
            CommandAction::ExportPreview => self.export_preview(),
            CommandAction::CancelRequest => {
                if self.chat.cancel() {
                    self.status_message = String::from("Request cancelled");
                }
            }
            CommandAction::Quit => self.should_quit = true,
        }
    }

    /// Sends the composer's text unless a reply is still pending, in which
    /// case the text stays in the input box.
    pub(crate) fn submit_chat(&mut self) {
        if self.chat.is_loading() {
            self.status_message = String::from("Still waiting for a reply (Esc cancels)");
            return;
        }
        let text = self.composer.take();
        // The open editor travels with the prompt so code requests can complete it.
        let editor = (self.layout.active_panel() == Some(PanelId::Develop)).then(|| EditorContext {
            code: self.document.text(),
            cursor_position: self.document.cursor(),
        });
        match self.chat.send_with_editor(&text, editor) {
            SendStatus::Sent if self.chat.is_loading() => {
                self.status_message = if self.chat.deep_research() {
                    String::from("Researching…")
                } else {
                    String::from("Thinking…")
                };
            }
            SendStatus::Sent => {}
            SendStatus::Busy => self.composer.set_text(&text),
            SendStatus::Empty => {}
        }
    }

    /// Applies a finished reply: preview actions land in the document and
    /// the layout in one step.
    pub(crate) fn handle_resolution(&mut self, resolution: Resolution) {
        self.status_message = match resolution.failure {
            None => String::from("Reply received"),
            Some(FailureKind::Error) => String::from("The request failed; see the log for details"),
            Some(FailureKind::TimedOut) => String::from("The request timed out"),
            Some(FailureKind::Cancelled) => String::from("Request cancelled"),
        };
        if let Some(action) = resolution.preview_action {
            self.apply_preview_action(action);
        }
    }

    /// Loads the code as an external update, switches the develop tab and
    /// shows the target panel.
    pub fn apply_preview_action(&mut self, action: PreviewAction) {
        info!(
            "applying preview action: {} chars -> {} / {}",
            action.code.chars().count(),
            action.target_panel.label(),
            action.target_develop_tab.label()
        );
        self.document.load_external(&action.code);
        self.document.set_active_tab(action.target_develop_tab);
        self.layout.show_panel(action.target_panel);
        self.editor_scroll = 0;
        self.preview_scroll = 0;
        self.refresh_document_views();
        self.status_message = format!(
            "Opened {} › {}",
            action.target_panel.label(),
            action.target_develop_tab.label()
        );
    }

    /// Brings the animator and the preview frame up to the document's
    /// revision. Called after every document change.
    pub(crate) fn refresh_document_views(&mut self) {
        self.animator.sync(&mut self.document);
        self.preview.sync(&self.document);
    }

    fn export_preview(&mut self) {
        self.preview.sync(&self.document);
        match self.preview.export(&self.workspace_root) {
            Ok(path) => {
                self.status_message = format!("Preview exported to {}", path.display());
            }
            Err(err) => {
                error!("preview export failed: {err:#}");
                self.status_message = format!("Preview export failed: {err}");
            }
        }
    }

    /// Prefills the chat input with a `/tool` command for the selected tool.
    pub(crate) fn prefill_selected_tool(&mut self) {
        let Some(spec) = self.chat.tools().specs().get(self.tool_selected) else {
            return;
        };
        let command = format!("/tool {} {{}}", spec.name);
        self.composer.set_text(&command);
        self.focus = FocusArea::Chat;
        self.status_message = format!("Fill in the JSON input for {} and press Enter", spec.name);
    }
}
