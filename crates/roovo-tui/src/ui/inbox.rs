//! Inbox
//!
//! Conversations of the signed-in user, most recent activity first.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use roovo_app::App;

const SELECTED_PREFIX: &str = "> ";
const UNSELECTED_PREFIX: &str = "  ";

/// Render the inbox list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Messages ");

    let items: Vec<ListItem> = if app.inbox().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No conversations yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        let user = app.session();
        app.inbox()
            .iter()
            .enumerate()
            .map(|(index, conversation)| {
                let name = user
                    .and_then(|u| conversation.counterpart_name(u))
                    .map_or_else(|| format!("Conversation {}", conversation.id), str::to_string);
                let (prefix, style) = if index == app.selected() {
                    (
                        SELECTED_PREFIX,
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )
                } else {
                    (UNSELECTED_PREFIX, Style::default())
                };

                let mut spans = vec![Span::raw(prefix), Span::styled(name, style)];
                if let Some(listing) = conversation.listing_title() {
                    spans.push(Span::styled(
                        format!("  {listing}"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}
