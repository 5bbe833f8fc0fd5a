use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Text field for the line being typed.
///
/// Key presses edit the buffer; every edit hands back the complete new text,
/// which is what the session controller consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    buffer: String,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Apply a key press. Returns the full buffer when the text changed.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<&str> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let changed = match key.code {
            KeyCode::Char('w') if ctrl => self.delete_word(),
            // terminals whose erase key sends ^H report it as Ctrl+H
            KeyCode::Char('h') if ctrl => self.buffer.pop().is_some(),
            KeyCode::Char('u') if ctrl => self.delete_all(),
            KeyCode::Backspace if ctrl || alt => self.delete_word(),
            KeyCode::Backspace => self.buffer.pop().is_some(),
            KeyCode::Char(c) if !ctrl && !alt => {
                self.buffer.push(c);
                true
            }
            _ => false,
        };

        changed.then_some(self.buffer.as_str())
    }

    /// Append pasted text; line breaks and tabs become spaces.
    pub fn on_paste(&mut self, text: &str) -> Option<&str> {
        let before = self.buffer.len();
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' | '\t' => self.buffer.push(' '),
                c if c.is_control() => {}
                c => self.buffer.push(c),
            }
        }

        (self.buffer.len() != before).then_some(self.buffer.as_str())
    }

    fn delete_word(&mut self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        let trimmed = self.buffer.trim_end_matches(' ');
        let cut = trimmed.rfind(' ').map_or(0, |idx| idx + 1);
        self.buffer.truncate(cut);
        true
    }

    fn delete_all(&mut self) -> bool {
        let changed = !self.buffer.is_empty();
        self.buffer.clear();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_appends() {
        let mut input = LineInput::new();
        assert_eq!(input.on_key(key(KeyCode::Char('h'))), Some("h"));
        assert_eq!(input.on_key(key(KeyCode::Char('i'))), Some("hi"));
    }

    #[test]
    fn test_shifted_chars_are_typed() {
        let mut input = LineInput::new();
        let shifted = KeyEvent::new(KeyCode::Char('H'), KeyModifiers::SHIFT);
        assert_eq!(input.on_key(shifted), Some("H"));
    }

    #[test]
    fn test_backspace() {
        let mut input = LineInput::new();
        input.on_key(key(KeyCode::Char('a')));
        input.on_key(key(KeyCode::Char('b')));

        assert_eq!(input.on_key(key(KeyCode::Backspace)), Some("a"));
        assert_eq!(input.on_key(key(KeyCode::Backspace)), Some(""));
    }

    #[test]
    fn test_backspace_on_empty_is_no_change() {
        let mut input = LineInput::new();
        assert_eq!(input.on_key(key(KeyCode::Backspace)), None);
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut input = LineInput::new();
        input.on_paste("blå");
        assert_eq!(input.on_key(key(KeyCode::Backspace)), Some("bl"));
    }

    #[test]
    fn test_delete_word() {
        let mut input = LineInput::new();
        input.on_paste("the quick brown");

        assert_eq!(input.on_key(ctrl('w')), Some("the quick "));
        assert_eq!(input.on_key(ctrl('w')), Some("the "));
        assert_eq!(input.on_key(ctrl('w')), Some(""));
        assert_eq!(input.on_key(ctrl('w')), None);
    }

    #[test]
    fn test_ctrl_h_erases_one_char() {
        let mut input = LineInput::new();
        input.on_paste("the quick");

        assert_eq!(input.on_key(ctrl('h')), Some("the quic"));
        assert_eq!(input.on_key(ctrl('h')), Some("the qui"));
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut input = LineInput::new();
        input.on_paste("abc");
        assert_eq!(input.on_key(ctrl('u')), Some(""));
        assert_eq!(input.on_key(ctrl('u')), None);
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        let mut input = LineInput::new();
        assert_eq!(input.on_key(ctrl('a')), None);
        assert_eq!(input.on_key(key(KeyCode::Left)), None);
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = LineInput::new();
        assert_eq!(input.on_paste("one\r\ntwo\tthree"), Some("one two three"));
        assert_eq!(input.on_paste(""), None);
    }
}
