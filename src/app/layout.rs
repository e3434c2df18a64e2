use super::{App, FocusArea, PanelId};

// Implementation block for layout-related logic in the App.
impl App {
    /// Moves keyboard focus between the side panel and the chat.
    ///
    /// With no panel open the chat is the only focus target.
    pub(crate) fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.layout.active_panel()) {
            (FocusArea::Chat, Some(_)) => FocusArea::Panel,
            _ => FocusArea::Chat,
        };
        self.status_message = format!("Focus changed to: {}", self.focus.label());
    }

    /// Ensures focus is not left on a closed panel.
    pub(crate) fn ensure_focus_available(&mut self) {
        if self.focus == FocusArea::Panel && self.layout.active_panel().is_none() {
            self.focus = FocusArea::Chat;
        }
    }

    /// Sidebar behaviour: opening the active panel again closes it.
    pub(crate) fn toggle_panel(&mut self, panel: PanelId) {
        self.layout.open_panel(panel);
        self.status_message = match self.layout.active_panel() {
            Some(active) => {
                self.focus = FocusArea::Panel;
                format!("{} panel opened", active.label())
            }
            None => format!("{} panel closed", panel.label()),
        };
        self.ensure_focus_available();
    }

    pub(crate) fn close_panel(&mut self) {
        if let Some(panel) = self.layout.active_panel() {
            self.status_message = format!("{} panel closed", panel.label());
        }
        self.layout.close_panel();
        self.ensure_focus_available();
    }

    pub(crate) fn nudge_panel(&mut self, delta_percent: f32) {
        if self.layout.active_panel().is_none() {
            self.status_message = String::from("Open a panel to resize it");
            return;
        }
        self.layout.nudge_width(delta_percent);
        self.status_message = format!("Panel width: {:.0}%", self.layout.width_percent());
    }
}
