use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::{App, FocusArea, PanelId};
use crate::definitions::{DevelopTab, HitTarget};

// Implementation block for mouse event handling in the App.
impl App {
    /// The main entry point for handling mouse events.
    ///
    /// Clicks are resolved against the regions registered during the last
    /// render. A divider drag keeps the pointer captured until any button is
    /// released, wherever the pointer is.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_mouse_down(event),
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.layout.is_resizing() {
                    self.layout.update_resize(i32::from(event.column));
                }
            }
            MouseEventKind::Up(_) => {
                if self.layout.is_resizing() {
                    self.layout.end_resize();
                    self.status_message =
                        format!("Panel width: {:.0}%", self.layout.width_percent());
                }
            }
            MouseEventKind::ScrollUp => self.handle_mouse_scroll(event, -1),
            MouseEventKind::ScrollDown => self.handle_mouse_scroll(event, 1),
            _ => {}
        }
        self.ensure_focus_available();
    }

    fn handle_mouse_down(&mut self, event: MouseEvent) {
        let Some(target) = self.hits.hit_test(event.column, event.row) else {
            return;
        };
        match target {
            HitTarget::SidebarButton(panel) => self.toggle_panel(panel),
            HitTarget::PanelClose => self.close_panel(),
            HitTarget::Divider => {
                if self.layout.begin_resize(i32::from(event.column)) {
                    self.status_message = String::from("Dragging to resize panel");
                }
            }
            HitTarget::DevelopTab(tab) => {
                self.document.set_active_tab(tab);
                self.focus = FocusArea::Panel;
            }
            HitTarget::ToolEntry(index) => {
                self.tool_selected = index;
                self.focus = FocusArea::Panel;
            }
            HitTarget::PanelBody => self.focus = FocusArea::Panel,
            HitTarget::ChatHistory | HitTarget::ChatInput => self.focus = FocusArea::Chat,
        }
    }

    fn handle_mouse_scroll(&mut self, event: MouseEvent, delta: isize) {
        match self.hits.hit_test(event.column, event.row) {
            Some(HitTarget::ChatHistory) => self.chat.conversation_mut().move_selection(delta),
            Some(HitTarget::PanelBody)
                if self.layout.active_panel() == Some(PanelId::Develop) =>
            {
                match self.document.active_tab() {
                    DevelopTab::Editor => {
                        self.editor_scroll = self.editor_scroll.saturating_add_signed(delta * 3)
                    }
                    DevelopTab::Preview => {
                        self.preview_scroll = self.preview_scroll.saturating_add_signed(delta * 3)
                    }
                    DevelopTab::Terminal => {}
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    use super::*;
    use crate::app::actions::tests::test_app;
    use crate::chat::orchestrator::tests::Behaviour;
    use crate::workspace::LayoutPhase;
    use crate::workspace::layout::{MAX_PANEL_WIDTH_PERCENT, MIN_PANEL_WIDTH_PERCENT};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn divider_drag_resizes_within_bounds() {
        let mut app = test_app(Behaviour::Fail);
        app.toggle_panel(PanelId::Develop);
        app.hits.register(HitTarget::Divider, Rect::new(45, 0, 1, 20));

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 45, 5));
        assert_eq!(app.layout.phase(), LayoutPhase::Resizing);

        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 1000, 5));
        assert_eq!(app.layout.width_percent(), MAX_PANEL_WIDTH_PERCENT);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 5));
        assert_eq!(app.layout.width_percent(), MIN_PANEL_WIDTH_PERCENT);

        // released far away from the divider
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 90, 19));
        assert_eq!(app.layout.phase(), LayoutPhase::Open);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 60, 5));
        assert_eq!(app.layout.width_percent(), MIN_PANEL_WIDTH_PERCENT);
    }

    #[test]
    fn divider_click_without_panel_does_nothing() {
        let mut app = test_app(Behaviour::Fail);
        app.hits.register(HitTarget::Divider, Rect::new(45, 0, 1, 20));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 45, 5));
        assert!(!app.layout.is_resizing());
    }

    #[test]
    fn clicks_route_to_registered_targets() {
        let mut app = test_app(Behaviour::Fail);
        app.hits.register(HitTarget::SidebarButton(PanelId::Tools), Rect::new(0, 0, 5, 3));
        app.hits.register(HitTarget::ChatInput, Rect::new(60, 16, 40, 4));

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 2, 1));
        assert_eq!(app.layout.active_panel(), Some(PanelId::Tools));
        assert_eq!(app.focus, FocusArea::Panel);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 70, 17));
        assert_eq!(app.focus, FocusArea::Chat);

        app.hits.register(HitTarget::DevelopTab(DevelopTab::Terminal), Rect::new(10, 1, 8, 1));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 12, 1));
        assert_eq!(app.document.active_tab(), DevelopTab::Terminal);
    }
}
