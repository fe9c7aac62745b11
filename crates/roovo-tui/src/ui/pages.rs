//! Static pages: home, listing detail and the sign-in prompt.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use roovo_app::Route;
use roovo_chat::ListingId;

/// Home screen with command hints.
pub fn home(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Welcome to Roovo"),
        Line::from(""),
        hint("/inbox            your conversations"),
        hint("/open <id>        open a conversation"),
        hint("/go <path>        go to any path"),
        hint("/login <user>     sign in"),
        hint("Tab switches home/inbox, Esc goes back"),
    ];
    let block = Block::default().borders(Borders::ALL).title(" Home ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Listing detail placeholder.
pub fn listing(frame: &mut Frame, id: ListingId, area: Rect) {
    let lines = vec![Line::from(format!("Listing {id}")), hint("Esc to go back")];
    let block = Block::default().borders(Borders::ALL).title(" Listing ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Prompt shown for chat routes without a session.
pub fn sign_in_required(frame: &mut Frame, route: Route, area: Rect) {
    let lines = vec![
        Line::from(format!("Sign in to view {route}")),
        hint("/login <user>"),
    ];
    let block = Block::default().borders(Borders::ALL).title(" Sign in ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn hint(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}
