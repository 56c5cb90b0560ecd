// TUI module - Terminal User Interface
//
// This module manages the terminal using ratatui. It handles:
// - Terminal initialization and cleanup (raw mode, alternate screen)
// - The event loop (keyboard input, animation ticks)
// - Routing submitted lines to the command interpreter or the chat path
//
// The loop never blocks on network I/O: request results arrive through the
// App's oneshot handoff and are polled on the frame tick.

pub mod app;
pub mod input;
pub mod modal;
pub mod toast;
pub mod ui;

use crate::commands;
use crate::config::Config;
use crate::rain::animator::FRAME_INTERVAL;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::ModalAction;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// First message rained onto the screen before any input
const WELCOME: &str = "Welcome to the Matrix. I'm Trinity. Follow the white rabbit, \
or just type your question below. /help lists the commands.";

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// when done - including on error paths, so a crash never leaves the shell
/// in raw mode.
pub async fn run_tui(config: Config) -> Result<()> {
    let mut app = App::new(config)?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let size = terminal.size().context("Failed to query terminal size")?;
    app.resize_grid(size.width, size.height.saturating_sub(ui::INPUT_BAR_HEIGHT));
    app.reveal(WELCOME);

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Abort any in-flight request before giving the terminal back
    app.shutdown();

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Each iteration draws one frame, then waits on whichever comes first:
/// keyboard input or the animation tick. The tick drives the animator and
/// polls the outstanding request, so a quit is observed within one frame
/// interval.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(FRAME_INTERVAL);

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            // Animation frame
            _ = tick_interval.tick() => {
                app.on_tick();
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input. The modal absorbs everything while open.
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if let Some(modal) = &mut app.modal {
        if let ModalAction::Close = modal.handle_input(key_event.code) {
            app.modal = None;
        }
        return;
    }

    // Ctrl+C quits like /q
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        app.should_quit = true;
        return;
    }

    match key_event.code {
        KeyCode::Enter => submit_line(app),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Up => {
            if let Some(entry) = app.session.history_prev() {
                app.input.set(entry);
            }
        }
        KeyCode::Down => {
            if let Some(entry) = app.session.history_next() {
                app.input.set(entry);
            }
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

/// Route a submitted line: slash-commands to the interpreter, everything
/// else to the chat path
fn submit_line(app: &mut App) {
    let text = app.input.take();
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    if text.starts_with('/') {
        match commands::parse(text) {
            Ok(command) => app.handle_command(command),
            Err(message) => app.show_toast(message),
        }
    } else {
        app.submit(text.to_string());
    }
}
