use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{App, CommandAction, FocusArea, PanelId};
use crate::definitions::DevelopTab;

impl App {
    /// The main entry point for handling keyboard events.
    ///
    /// Global shortcuts win; everything else goes to the focused area.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if let Some(action) = global_shortcut(&key, self.chat.is_loading()) {
            self.execute_action(action);
            return;
        }

        match self.focus {
            FocusArea::Panel => self.handle_panel_key(key),
            FocusArea::Chat => self.handle_chat_key(key),
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        match self.layout.active_panel() {
            Some(PanelId::Develop) => match self.document.active_tab() {
                DevelopTab::Editor => self.handle_editor_key(key),
                DevelopTab::Preview => match key.code {
                    KeyCode::Up => self.preview_scroll = self.preview_scroll.saturating_sub(1),
                    KeyCode::Down => self.preview_scroll = self.preview_scroll.saturating_add(1),
                    KeyCode::PageUp => self.preview_scroll = self.preview_scroll.saturating_sub(10),
                    KeyCode::PageDown => {
                        self.preview_scroll = self.preview_scroll.saturating_add(10)
                    }
                    KeyCode::Home => self.preview_scroll = 0,
                    _ => {}
                },
                DevelopTab::Terminal => {}
            },
            Some(PanelId::Tools) => {
                let count = self.chat.tools().specs().len();
                match key.code {
                    KeyCode::Up => self.tool_selected = self.tool_selected.saturating_sub(1),
                    KeyCode::Down if count > 0 => {
                        self.tool_selected = (self.tool_selected + 1).min(count - 1)
                    }
                    KeyCode::Enter => self.prefill_selected_tool(),
                    _ => {}
                }
            }
            Some(PanelId::Browser) | None => {}
        }
    }

    /// Editing keys for the Develop › Editor tab. Every edit counts as user
    /// typing, so the views are refreshed right away and any running reveal
    /// stops with the typed text on screen.
    fn handle_editor_key(&mut self, key: KeyEvent) {
        let doc = &mut self.document;
        let edited = match key.code {
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                doc.insert_char(ch);
                true
            }
            KeyCode::Tab => {
                doc.insert_char(' ');
                doc.insert_char(' ');
                true
            }
            KeyCode::Enter => {
                doc.insert_newline();
                true
            }
            KeyCode::Backspace => {
                doc.backspace();
                true
            }
            KeyCode::Delete => {
                doc.delete_forward();
                true
            }
            KeyCode::Left => {
                doc.move_left();
                false
            }
            KeyCode::Right => {
                doc.move_right();
                false
            }
            KeyCode::Up => {
                doc.move_up();
                false
            }
            KeyCode::Down => {
                doc.move_down();
                false
            }
            KeyCode::Home => {
                doc.move_line_start();
                false
            }
            KeyCode::End => {
                doc.move_line_end();
                false
            }
            _ => return,
        };
        if edited {
            self.refresh_document_views();
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        let newline = key.modifiers.contains(KeyModifiers::SHIFT)
            || key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Enter if newline => self.composer.insert_newline(),
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.composer.insert_char(ch)
            }
            KeyCode::Backspace => self.composer.backspace(),
            KeyCode::Delete => self.composer.delete(),
            KeyCode::Left => self.composer.move_left(),
            KeyCode::Right => self.composer.move_right(),
            KeyCode::Home => self.composer.move_home(),
            KeyCode::End => self.composer.move_end(),
            KeyCode::Up => self.composer.history_previous(),
            KeyCode::Down => self.composer.history_next(),
            KeyCode::PageUp => self.chat.conversation_mut().move_selection(-1),
            KeyCode::PageDown => self.chat.conversation_mut().move_selection(1),
            _ => {}
        }
    }
}

/// Maps a key to an app-wide command. `Esc` only means "cancel" while a
/// reply is pending.
fn global_shortcut(key: &KeyEvent, loading: bool) -> Option<CommandAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('q') if ctrl => CommandAction::Quit,
        KeyCode::Char('w') if ctrl => CommandAction::ClosePanel,
        KeyCode::Char('r') if ctrl => CommandAction::ToggleDeepResearch,
        KeyCode::Char('e') if ctrl => CommandAction::ExportPreview,
        KeyCode::Right if ctrl => CommandAction::WidenPanel,
        KeyCode::Left if ctrl => CommandAction::NarrowPanel,
        KeyCode::F(2) => CommandAction::TogglePanel(PanelId::Browser),
        KeyCode::F(3) => CommandAction::TogglePanel(PanelId::Develop),
        KeyCode::F(4) => CommandAction::TogglePanel(PanelId::Tools),
        KeyCode::F(5) => CommandAction::CycleDevelopTab,
        KeyCode::F(6) => CommandAction::CycleFocus,
        KeyCode::Esc if loading => CommandAction::CancelRequest,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::tests::test_app;
    use crate::chat::orchestrator::tests::Behaviour;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, ch: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
    }

    #[test]
    fn typing_during_reveal_shows_typed_text_at_once() {
        let mut app = test_app(Behaviour::Fail);
        press(&mut app, KeyCode::F(3));
        assert!(app.animator.is_revealing());
        app.animator.tick(&mut app.document);

        press(&mut app, KeyCode::Char('x'));
        let typed = app.document.text();
        assert!(typed.contains('x'));
        assert_eq!(app.animator.displayed(), typed);
        assert!(!app.animator.is_revealing());
        assert!(!app.document.is_external_update());

        for _ in 0..5 {
            app.animator.tick(&mut app.document);
        }
        assert_eq!(app.animator.displayed(), typed);
    }

    #[test]
    fn function_keys_toggle_panels() {
        let mut app = test_app(Behaviour::Fail);
        press(&mut app, KeyCode::F(4));
        assert_eq!(app.layout.active_panel(), Some(PanelId::Tools));
        press(&mut app, KeyCode::F(4));
        assert_eq!(app.layout.active_panel(), None);
        press(&mut app, KeyCode::F(2));
        ctrl(&mut app, 'w');
        assert_eq!(app.layout.active_panel(), None);
    }

    #[test]
    fn chat_keys_edit_composer() {
        let mut app = test_app(Behaviour::Fail);
        assert_eq!(app.focus, FocusArea::Chat);
        for ch in "ok".chars() {
            press(&mut app, KeyCode::Char(ch));
        }
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        press(&mut app, KeyCode::Char('!'));
        assert_eq!(app.composer.text(), "ok\n!");
    }

    #[test]
    fn tools_panel_navigation() {
        let mut app = test_app(Behaviour::Fail);
        press(&mut app, KeyCode::F(4));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.tool_selected, 1);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.composer.text(), "/tool searchAdverseEffects {}");
    }

    #[test]
    fn ctrl_q_quits_and_ctrl_r_toggles_research() {
        let mut app = test_app(Behaviour::Fail);
        ctrl(&mut app, 'r');
        assert!(app.chat.deep_research());
        ctrl(&mut app, 'q');
        assert!(app.should_quit);
    }

    #[test]
    fn escape_without_pending_reply_does_nothing() {
        let mut app = test_app(Behaviour::Fail);
        let before = app.chat.conversation().len();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.chat.conversation().len(), before);
    }
}
