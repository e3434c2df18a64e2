use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};

/// Events driving the main loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Housekeeping tick: polls the pending reply.
    Tick,
    /// Animation frame for the typing reveal and the panel transition.
    Frame,
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// The terminal was resized; the next draw picks up the new size.
    Resize,
}

impl AppEvent {
    /// Maps a terminal event, dropping the kinds the app does not use.
    pub fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) => Some(Self::Key(key)),
            CrosstermEvent::Mouse(mouse) => Some(Self::Mouse(mouse)),
            CrosstermEvent::Resize(_, _) => Some(Self::Resize),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn maps_terminal_events() {
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(matches!(
            AppEvent::from_terminal(CrosstermEvent::Key(key)),
            Some(AppEvent::Key(_))
        ));
        assert!(matches!(
            AppEvent::from_terminal(CrosstermEvent::Resize(80, 24)),
            Some(AppEvent::Resize)
        ));
        assert!(AppEvent::from_terminal(CrosstermEvent::FocusGained).is_none());
    }
}
