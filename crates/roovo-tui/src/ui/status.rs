//! Status bar
//!
//! Session, location and the latest status message.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use roovo_app::App;

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let session = match app.session() {
        Some(user) => Span::styled(
            user.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("signed out", Style::default().fg(Color::Yellow)),
    };

    let location = format!(" | {} ", app.current_path());
    let message = app.status_message().map_or_else(String::new, |m| format!("| {m}"));

    let status_line = Line::from(vec![
        Span::raw(" "),
        session,
        Span::raw(location),
        Span::styled(message, Style::default().fg(Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
