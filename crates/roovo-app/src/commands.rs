//! Slash command parsing for the input line.
//!
//! Anything not starting with `/` is message text.

use roovo_chat::{ConversationId, UserId};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/go <path>`: navigate to a path.
    Go {
        /// Target path, as typed.
        path: String,
    },
    /// `/open <id>`: open a conversation.
    Open {
        /// Conversation to open.
        conversation_id: ConversationId,
    },
    /// `/inbox`.
    Inbox,
    /// `/home`.
    Home,
    /// `/back`.
    Back,
    /// `/forward`.
    Forward,
    /// `/login <user>`.
    Login {
        /// User to sign in as.
        user_id: UserId,
    },
    /// `/logout`.
    Logout,
    /// `/quit` or `/q`.
    Quit,
    /// Plain text to send.
    Message {
        /// Text as typed.
        content: String,
    },
    /// Unrecognized command.
    Unknown {
        /// The command word.
        input: String,
    },
    /// Recognized command with bad arguments.
    InvalidArgs {
        /// The command word.
        command: &'static str,
        /// What was wrong.
        error: String,
    },
}

/// Parse one input line.
pub fn parse(line: &str) -> Command {
    let Some(cmd) = line.strip_prefix('/') else {
        return Command::Message { content: line.to_string() };
    };

    let mut parts = cmd.split_whitespace();
    let word = parts.next().unwrap_or("");
    let arg = parts.next();

    match word {
        "go" => match arg {
            Some(path) => Command::Go { path: path.to_string() },
            None => usage("go", "<path>"),
        },
        "open" => match arg.map(str::parse::<ConversationId>) {
            Some(Ok(conversation_id)) => Command::Open { conversation_id },
            Some(Err(e)) => Command::InvalidArgs { command: "open", error: e.to_string() },
            None => usage("open", "<conversation_id>"),
        },
        "inbox" => Command::Inbox,
        "home" => Command::Home,
        "back" => Command::Back,
        "forward" => Command::Forward,
        "login" => match arg {
            Some(user) => Command::Login { user_id: UserId::new(user) },
            None => usage("login", "<user_id>"),
        },
        "logout" => Command::Logout,
        "quit" | "q" => Command::Quit,
        other => Command::Unknown { input: other.to_string() },
    }
}

fn usage(command: &'static str, args: &str) -> Command {
    Command::InvalidArgs { command, error: format!("usage: /{command} {args}") }
}
