//! The `app` module is the core of mission control.
//!
//! It owns the session state, routes keyboard and mouse input, and applies
//! finished chat replies to the editor document and the panel layout.

/// `actions`: command execution, chat submission and preview actions.
mod actions;
/// `init`: construction of `App` from settings.
mod init;
/// `keyboard`: key routing for global shortcuts, the panel and the chat.
mod keyboard;
/// `layout`: focus cycling and side panel helpers.
mod layout;
/// `mouse`: clicks, drags and scrolling against the hit registry.
mod mouse;
/// `state`: the `App` struct and `CommandAction`.
mod state;
/// `tick`: housekeeping ticks and animation frames.
mod tick;

pub use state::{App, CommandAction};

#[cfg(test)]
pub(crate) use actions::tests::test_app;

use crate::definitions::{FocusArea, PanelId};

/// Columns taken by the editor's line number gutter.
pub(crate) const EDITOR_GUTTER_WIDTH: u16 = 7;
