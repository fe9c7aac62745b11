//! Bottom navigation bar
//!
//! Shortcuts to the top-level sections. Hidden on listing pages.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use roovo_app::{App, Route};

const SECTIONS: [(Route, &str); 2] = [(Route::Home, "Home"), (Route::Inbox, "Messages")];

/// Render the navigation bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.route();
    let mut spans = Vec::with_capacity(SECTIONS.len() * 2 + 1);
    for (route, label) in SECTIONS {
        let style = if active == Some(route)
            || (route == Route::Inbox && matches!(active, Some(Route::Conversation { .. })))
        {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {label} "), style));
    }
    spans.push(Span::styled("  Tab to switch", Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
