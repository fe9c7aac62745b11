//! Input line
//!
//! The prompt is titled after what Enter will do on the mounted view. An
//! empty line shows a dimmed hint; long lines scroll so the cursor stays
//! inside the box.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use roovo_app::{App, View};

const PROMPT: &str = "> ";
const PROMPT_WIDTH: u16 = 3; // border + "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Box title for `app`'s input line.
fn title(app: &App) -> String {
    match app.view() {
        View::Conversation(view) => format!(" Message {} ", view.title()),
        View::SignInRequired { .. } => " Sign in ".to_string(),
        _ => " Command ".to_string(),
    }
}

/// Dimmed hint shown while the line is empty.
fn placeholder(view: &View) -> &'static str {
    match view {
        View::Conversation(_) => "Type a message, Enter to send",
        View::SignInRequired { .. } => "/login <user>",
        View::Inbox => "Enter opens the selected conversation",
        View::Home | View::Listing { .. } | View::NotFound { .. } => "/go <path>, Esc goes back",
    }
}

/// Render the input line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let input = app.input();
    let block = Block::default().borders(Borders::ALL).title(title(app));

    let width = usize::from(area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING));
    let scroll = input.cursor().saturating_sub(width);

    let text = if input.buffer().is_empty() {
        Span::styled(placeholder(app.view()), Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = input.buffer().chars().skip(scroll).collect();
        Span::styled(visible, Style::default().fg(Color::White))
    };
    let paragraph = Paragraph::new(Line::from(vec![Span::raw(PROMPT), text])).block(block);
    frame.render_widget(paragraph, area);

    let cursor_offset = (input.cursor() - scroll) as u16;
    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
