//! Conversation view
//!
//! Messages of the mounted conversation, newest at the bottom, with a
//! marker on entries that are not confirmed.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use roovo_app::ConversationView;
use roovo_chat::{Message, MessageStatus};

const BORDER_SIZE: u16 = 2;
const SELF_LABEL: &str = "you";

/// Inline marker for a message status. Confirmed messages have none.
pub fn status_marker(status: MessageStatus) -> Option<Span<'static>> {
    match status {
        MessageStatus::Pending => {
            Some(Span::styled(" (sending)", Style::default().fg(Color::DarkGray)))
        },
        MessageStatus::Failed => Some(Span::styled(
            " ! not sent",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        MessageStatus::Confirmed => None,
    }
}

/// Render the conversation area.
pub fn render(frame: &mut Frame, view: &ConversationView, area: Rect) {
    let mut title = format!(" {} ", view.title());
    if let Some(listing) = view.details.as_ref().and_then(|c| c.listing_title()) {
        title.push_str(&format!("- {listing} "));
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = if view.log.is_loading() && view.log.messages().is_empty() {
        vec![hint("Loading messages...")]
    } else if view.log.messages().is_empty() {
        vec![hint("No messages yet. Type below to say hello.")]
    } else {
        view.log.rendered().into_iter().map(|message| message_item(view, message)).collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn message_item<'a>(view: &'a ConversationView, message: &'a Message) -> ListItem<'a> {
    let local = view.log.local_user();
    let (sender, color) = if message.is_from(local) {
        (SELF_LABEL.to_string(), Color::Cyan)
    } else {
        let name = view
            .details
            .as_ref()
            .and_then(|c| c.counterpart_name(local))
            .unwrap_or(message.sender_id.as_str());
        (name.to_string(), Color::Green)
    };

    let mut spans = vec![
        Span::styled(sender, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(": "),
        Span::raw(message.content.as_str()),
    ];
    if let Some(marker) = status_marker(message.status) {
        spans.push(marker);
    }
    ListItem::new(Line::from(spans))
}

fn hint(text: &'static str) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(text, Style::default().fg(Color::DarkGray))))
}
