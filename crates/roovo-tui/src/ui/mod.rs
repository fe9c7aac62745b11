//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into a frame.

mod conversation;
mod inbox;
mod input;
mod nav;
mod pages;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};
use roovo_app::{App, View};

pub use conversation::status_marker;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let nav_height = u16::from(app.shows_bottom_nav());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(nav_height),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area, nav_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, *main_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
    if nav_height > 0 {
        nav::render(frame, app, *nav_area);
    }
}

/// Render the mounted view.
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    match app.view() {
        View::Home => pages::home(frame, area),
        View::Listing { id } => pages::listing(frame, *id, area),
        View::Inbox => inbox::render(frame, app, area),
        View::Conversation(view) => conversation::render(frame, view, area),
        View::SignInRequired { route } => pages::sign_in_required(frame, *route, area),
        View::NotFound { .. } => {},
    }
}
