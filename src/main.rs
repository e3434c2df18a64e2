pub mod app;
pub mod backend;
pub mod chat;
pub mod config;
pub mod definitions;
pub mod event;
pub mod logging;
pub mod tools;
pub mod tui;
pub mod ui;
pub mod workspace;

use anyhow::{Context, Result};
use app::App;
use config::Settings;
use crossterm::event::EventStream;
use event::AppEvent;
use futures_util::StreamExt;
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tui::Tui;

#[tokio::main]
async fn main() -> Result<()> {
    let workspace_root = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let bootstrap = Settings::bootstrap(&workspace_root)?;
    if let Err(err) = logging::init(&workspace_root, &bootstrap.settings.logging) {
        eprintln!("logging disabled: {err:#}");
    }
    info!("{}", bootstrap.message);

    let frame_rate = bootstrap.settings.ui.reveal_interval();
    let mut app = App::new(workspace_root, bootstrap.settings)?;
    app.status_message = format!("{} · {}", bootstrap.message, app.status_message);

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, frame_rate).await;
    tui::restore()?;
    if let Err(err) = &result {
        error!("main loop stopped: {err:#}");
    }
    result
}

/// Draws, then waits for the next tick, animation frame or terminal event.
/// Frames are only scheduled while something is animating.
async fn run(terminal: &mut Tui, app: &mut App, frame_rate: Duration) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticks = tokio::time::interval(app.tick_rate);
    let mut frames = tokio::time::interval(frame_rate);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;
        app.on_frame_drawn();

        let animating = app.is_animating();
        let event = tokio::select! {
            _ = ticks.tick() => AppEvent::Tick,
            _ = frames.tick(), if animating => AppEvent::Frame,
            maybe_event = events.next() => match maybe_event {
                Some(Ok(raw)) => match AppEvent::from_terminal(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(err)) => return Err(err).context("terminal event stream failed"),
                None => break,
            },
        };

        match event {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Frame => {
                app.on_frame();
            }
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
            AppEvent::Resize => {}
        }
    }

    if app.chat.is_loading() {
        app.chat.cancel();
    }
    info!("session closed");
    Ok(())
}
