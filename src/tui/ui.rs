// Rendering - rain pane, input bar, help overlay
//
// One draw per event-loop iteration: the grid (already painted by the
// tick) becomes a paragraph of styled lines, the input bar shows the
// prompt and any in-flight status, and overlays go on top.

use super::app::App;
use super::modal::Modal;
use crate::rain::grid::{MIN_HEIGHT, MIN_WIDTH};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Rows reserved for the bordered input bar at the bottom
pub const INPUT_BAR_HEIGHT: u16 = 3;

/// Prompt shown in front of the input line
const PROMPT: &str = "Type your message: ";

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(INPUT_BAR_HEIGHT),
        ])
        .split(f.area());

    draw_rain(f, app, chunks[0]);
    draw_input(f, app, chunks[1]);

    if let Some(Modal::Help) = app.modal {
        render_help(f, app);
    }
    if let Some(toast) = &app.toast {
        toast.render(f, chunks[0], app.config.color);
    }
}

fn draw_rain(f: &mut Frame, app: &mut App, area: Rect) {
    // Re-query the viewport each frame; after a terminal resize the grid
    // follows here and the running animation is clipped to it
    let want = (area.width.max(MIN_WIDTH), area.height.max(MIN_HEIGHT));
    if (app.grid.width(), app.grid.height()) != want {
        app.resize_grid(area.width, area.height);
    }

    let paragraph = Paragraph::new(Text::from(app.grid.lines(app.config.color)));
    f.render_widget(paragraph, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let color = app.config.color;
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color.body()))
        .title(format!(" trinity · {} ", app.config.model));
    if app.pending.is_some() {
        block = block.title_bottom(
            Line::from(format!(" Waiting for {}... ", app.config.model)).right_aligned(),
        );
    }

    let prompt_width = PROMPT.len() as u16;
    let avail = area
        .width
        .saturating_sub(2) // borders
        .saturating_sub(prompt_width + 1);
    let (tail, tail_width) = app.input.visible_tail(avail);

    let line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(Color::DarkGray)),
        Span::styled(
            tail.to_string(),
            Style::default().fg(Color::White),
        ),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);

    if app.modal.is_none() {
        f.set_cursor_position((area.x + 1 + prompt_width + tail_width, area.y + 1));
    }
}

/// Render the help modal overlay
fn render_help(f: &mut Frame, app: &App) {
    let key_style = Style::default()
        .fg(app.config.color.head())
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(Color::White);
    let header_style = Style::default()
        .fg(app.config.color.head())
        .add_modifier(Modifier::BOLD);

    // Helper to create an entry line: "    key         description"
    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<16}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Commands", header_style)),
        kb("/help", "Show this help"),
        kb("/q", "Exit program"),
        kb("/clear", "Clear conversation history"),
        kb("/save", "Save conversation to file"),
        kb("/model <name>", "Change the model"),
        kb("/system", "Show session information"),
        kb("/color <name>", "Change the rain color"),
        Line::raw(""),
        Line::from(Span::styled("  Keys", header_style)),
        kb("Up/Down", "Navigate input history"),
        kb("Enter", "Send message"),
        kb("Ctrl+C", "Exit program"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Colors: ", desc_style),
            Span::styled(crate::theme::RainColor::names(), key_style),
        ]),
    ]);

    let width = 58;
    let height = 18;
    let area = centered_rect(width, height, f.area());

    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.config.color.head()))
            .title(" Help ")
            .title_bottom(Line::from(" Press Esc to close ").centered()),
    );
    f.render_widget(paragraph, area);
}

/// Calculate centered rect for modal dialogs
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
