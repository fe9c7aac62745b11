//! Rendering against ratatui's in-memory backend.

use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
use roovo_app::{App, AppAction, AppEvent, KeyInput, View};
use roovo_chat::{
    Conversation, ConversationId, ListingSummary, MessageRecord, MessageStatus, PartySummary,
    UserId,
};
use roovo_tui::ui;

const GUEST: &str = "guest-1";

fn draw(app: &App) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
    terminal.draw(|frame| ui::render(frame, app)).unwrap();
    rows(terminal.backend().buffer())
}

fn rows(buffer: &Buffer) -> Vec<String> {
    buffer
        .content
        .chunks(buffer.area.width as usize)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}

fn screen_contains(screen: &[String], needle: &str) -> bool {
    screen.iter().any(|row| row.contains(needle))
}

fn app_at(path: &str, user: Option<&str>) -> App {
    let mut app = App::new(path, 1).unwrap();
    app.start();
    if let Some(user) = user {
        app.handle(AppEvent::SessionStarted { user_id: UserId::new(user) });
    }
    app
}

fn conversation(id: u64, host_name: &str) -> Conversation {
    Conversation {
        id: ConversationId(id),
        guest_id: UserId::new(GUEST),
        host_id: UserId::new("host-1"),
        listing_id: None,
        last_message_at: None,
        guest: Some(PartySummary { name: "Gia".into() }),
        host: Some(PartySummary { name: host_name.into() }),
        listing: Some(ListingSummary { title: "Beach hut".into(), primary_image_url: None }),
    }
}

#[test]
fn conversation_marks_pending_and_failed_messages() {
    let mut app = app_at("/messages/42", Some(GUEST));
    let generation = app.generation();
    app.handle(AppEvent::HistoryLoaded {
        conversation_id: ConversationId(42),
        generation,
        records: vec![MessageRecord {
            id: 1,
            conversation_id: ConversationId(42),
            sender_id: UserId::new("host-1"),
            content: "Welcome".into(),
            is_verified: true,
            created_at: None,
        }],
    });
    app.handle(AppEvent::ConversationLoaded { generation, conversation: conversation(42, "Hal") });
    app.send_message("Hi");
    let failed = app.send_message("Oops");
    let Some(AppAction::SendMessage(outgoing)) = failed.into_iter().last() else {
        panic!("send produced no request");
    };
    app.handle(AppEvent::SendFailed {
        conversation_id: ConversationId(42),
        generation,
        temp_id: outgoing.temp_id,
        reason: "timeout".into(),
    });

    let screen = draw(&app);
    assert!(screen_contains(&screen, "Hal - Beach hut"));
    assert!(screen_contains(&screen, "Hal: Welcome"));
    assert!(screen_contains(&screen, "you: Hi (sending)"));
    assert!(screen_contains(&screen, "you: Oops ! not sent"));
    assert!(screen_contains(&screen, "Message not sent"));
}

#[test]
fn loading_conversation_says_so() {
    let app = app_at("/messages/42", Some(GUEST));
    assert!(screen_contains(&draw(&app), "Loading messages..."));
}

#[test]
fn inbox_lists_conversations_with_selection() {
    let mut app = app_at("/messages", Some(GUEST));
    app.handle(AppEvent::ConversationsLoaded {
        user_id: UserId::new(GUEST),
        conversations: vec![conversation(1, "Hal"), conversation(2, "Ida")],
    });
    app.select_next();

    let screen = draw(&app);
    assert!(screen_contains(&screen, "  Hal  Beach hut"));
    assert!(screen_contains(&screen, "> Ida"));
}

#[test]
fn listing_page_hides_bottom_nav() {
    let listing = draw(&app_at("/listing/3", None));
    assert!(screen_contains(&listing, "Listing 3"));
    assert!(!screen_contains(&listing, "Tab to switch"));

    let home = draw(&app_at("/", None));
    assert!(screen_contains(&home, "Welcome to Roovo"));
    assert!(screen_contains(&home, "Tab to switch"));
}

#[test]
fn anonymous_chat_route_prompts_sign_in() {
    let app = app_at("/messages/42", None);
    assert!(matches!(app.view(), View::SignInRequired { .. }));

    let screen = draw(&app);
    assert!(screen_contains(&screen, "Sign in to view /messages/42"));
    assert!(screen_contains(&screen, "signed out"));
}

#[test]
fn unmatched_path_renders_empty_main_area() {
    let app = app_at("/nowhere", None);
    let screen = draw(&app);

    let main_rows = screen.len() - 5;
    assert!(screen[..main_rows].iter().all(|row| row.trim().is_empty()));
    assert!(screen_contains(&screen, "/nowhere"));
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle(AppEvent::Key(KeyInput::Char(c)));
    }
}

#[test]
fn input_hint_follows_view() {
    let mut app = app_at("/messages/42", Some(GUEST));
    let screen = draw(&app);
    assert!(screen_contains(&screen, "Message Conversation 42"));
    assert!(screen_contains(&screen, "> Type a message, Enter to send"));

    app.handle(AppEvent::ConversationLoaded {
        generation: app.generation(),
        conversation: conversation(42, "Hal"),
    });
    assert!(screen_contains(&draw(&app), "Message Hal"));

    let screen = draw(&app_at("/messages/42", None));
    assert!(screen_contains(&screen, "Sign in"));
    assert!(screen_contains(&screen, "> /login <user>"));

    let screen = draw(&app_at("/messages", Some(GUEST)));
    assert!(screen_contains(&screen, "> Enter opens the selected conversation"));
}

#[test]
fn typed_text_replaces_hint() {
    let mut app = app_at("/", None);
    type_text(&mut app, "/go /messages");

    let screen = draw(&app);
    let input_row = screen.iter().find(|row| row.contains("> /go /messages")).unwrap();
    assert!(!input_row.contains("Esc goes back"));
}

#[test]
fn long_input_scrolls_to_cursor() {
    let mut app = app_at("/", None);
    let line = format!("start{}END", "x".repeat(60));
    type_text(&mut app, &line);

    let screen = draw(&app);
    let input_row = screen.iter().find(|row| row.contains("> x")).unwrap();
    assert!(input_row.contains("END"));
    assert!(!input_row.contains("start"));
}

#[test]
fn status_markers() {
    assert!(ui::status_marker(MessageStatus::Confirmed).is_none());
    assert_eq!(ui::status_marker(MessageStatus::Pending).unwrap().content, " (sending)");
    assert_eq!(ui::status_marker(MessageStatus::Failed).unwrap().content, " ! not sent");
}
