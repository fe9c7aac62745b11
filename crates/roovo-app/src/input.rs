//! Terminal-agnostic keyboard input and the line editor.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (submit line).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (toggle inbox).
    Tab,
    /// Escape key (history back).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key (inbox selection).
    Up,
    /// Down arrow key (inbox selection).
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Single-line text editor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits
/// cleanly.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply an editing key. Returns `false` for keys that do not edit.
    pub fn edit(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter | KeyInput::Tab | KeyInput::Esc | KeyInput::Up | KeyInput::Down => {
                return false;
            },
        }
        true
    }

    /// Take the line, leaving the editor empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::new();
        for c in text.chars() {
            input.edit(KeyInput::Char(c));
        }
        input
    }

    #[test]
    fn edits_at_cursor() {
        let mut input = typed("hllo");
        input.edit(KeyInput::Home);
        input.edit(KeyInput::Right);
        input.edit(KeyInput::Char('e'));
        assert_eq!(input.buffer(), "hello");
        assert_eq!(input.cursor(), 2);

        input.edit(KeyInput::End);
        input.edit(KeyInput::Backspace);
        assert_eq!(input.buffer(), "hell");

        input.edit(KeyInput::Home);
        input.edit(KeyInput::Delete);
        assert_eq!(input.buffer(), "ell");
    }

    #[test]
    fn multibyte_characters() {
        let mut input = typed("héé");
        input.edit(KeyInput::Left);
        input.edit(KeyInput::Backspace);
        assert_eq!(input.buffer(), "hé");
        input.edit(KeyInput::Right);
        input.edit(KeyInput::Right);
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn take_clears() {
        let mut input = typed("hi");
        assert_eq!(input.take(), "hi");
        assert_eq!(input.buffer(), "");
        assert_eq!(input.cursor(), 0);
        assert!(!input.edit(KeyInput::Enter));
    }
}
