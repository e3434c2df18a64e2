use super::App;
use crate::chat::session::clock_label;

// Implementation block for tick-related logic in the App.
impl App {
    /// Housekeeping tick: collects a finished reply, if any.
    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);

        if let Some(resolution) = self.chat.poll() {
            self.handle_resolution(resolution);
        }
    }

    /// Animation frame: one revealed character and one transition step.
    /// Returns whether another frame is needed.
    pub fn on_frame(&mut self) -> bool {
        self.animator.tick(&mut self.document);
        self.layout.advance_transition();
        self.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_revealing() || self.layout.is_transitioning()
    }

    /// Called after a frame reaches the terminal. The greeting gets its
    /// timestamp the first time.
    pub fn on_frame_drawn(&mut self) {
        if self.first_frame_drawn {
            return;
        }
        self.first_frame_drawn = true;
        self.chat.conversation_mut().stamp_pending(&clock_label());
    }

    /// Frame of the loading spinner shown while a reply is pending.
    pub(crate) fn spinner(&self) -> char {
        const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
        FRAMES[(self.ticks % FRAMES.len() as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::app::actions::tests::test_app;
    use crate::backend::{AssistantReply, PreviewAction};
    use crate::chat::orchestrator::tests::Behaviour;
    use crate::definitions::{DevelopTab, PanelId};

    #[test]
    fn greeting_is_stamped_on_first_frame_only() {
        let mut app = test_app(Behaviour::Fail);
        assert!(app.chat.conversation().messages()[0].timestamp.is_none());
        app.on_frame_drawn();
        let stamped = app.chat.conversation().messages()[0].timestamp.clone();
        assert!(stamped.is_some());
        app.on_frame_drawn();
        assert_eq!(app.chat.conversation().messages()[0].timestamp, stamped);
    }

    #[test]
    fn frames_run_until_reveal_and_transition_settle() {
        let mut app = test_app(Behaviour::Fail);
        app.toggle_panel(PanelId::Develop);
        assert!(app.is_animating());
        let mut frames = 0;
        while app.on_frame() {
            frames += 1;
            assert!(frames < 100_000);
        }
        assert_eq!(app.animator.displayed(), app.document.text());
        assert_eq!(app.layout.rendered_percent(), app.layout.width_percent());
    }

    #[tokio::test]
    async fn tick_applies_finished_reply() {
        let reply = AssistantReply::from_text("here").with_preview(PreviewAction {
            code: String::from("ABC"),
            target_panel: PanelId::Develop,
            target_develop_tab: DevelopTab::Editor,
        });
        let mut app = test_app(Behaviour::Reply(reply));
        while app.on_frame() {}
        app.composer.set_text("make abc");
        app.submit_chat();

        let mut waited = 0;
        while app.chat.is_loading() {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.on_tick();
            waited += 1;
            assert!(waited < 400);
        }
        assert_eq!(app.layout.active_panel(), Some(PanelId::Develop));

        let mut seen = vec![app.animator.displayed().to_string()];
        while app.on_frame() {
            seen.push(app.animator.displayed().to_string());
        }
        seen.dedup();
        assert_eq!(seen, vec!["", "A", "AB", "ABC"]);
        assert!(!app.document.is_external_update());
    }
}
