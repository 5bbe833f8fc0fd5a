use crate::mistakes::MistakeTracker;

/// How a key should be highlighted on the on-screen keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHighlight {
    Next,
    Weak,
}

/// Keyboard hints derived from the session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyHints {
    pub next: Option<char>,
    pub weak: Vec<char>,
}

impl KeyHints {
    pub fn project(
        current_line: Option<&str>,
        typed: &str,
        mistakes: &MistakeTracker,
        weak_key_count: usize,
    ) -> Self {
        let next = current_line.and_then(|line| line.chars().nth(typed.chars().count()));

        Self {
            next,
            weak: mistakes.top(weak_key_count),
        }
    }

    /// Highlight for the key producing `c`; "next" wins over "weak".
    /// Keycaps carry one label for both cases, so matching ignores case.
    pub fn highlight_for(&self, c: char) -> Option<KeyHighlight> {
        if self.next.is_some_and(|next| same_key(next, c)) {
            Some(KeyHighlight::Next)
        } else if self.weak.iter().any(|weak| same_key(*weak, c)) {
            Some(KeyHighlight::Weak)
        } else {
            None
        }
    }
}

fn same_key(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(chars: &str) -> MistakeTracker {
        let mut t = MistakeTracker::new();
        chars.chars().for_each(|c| t.record(c));
        t
    }

    #[test]
    fn test_next_is_char_after_typed() {
        let hints = KeyHints::project(Some("dog"), "do", &MistakeTracker::new(), 3);
        assert_eq!(hints.next, Some('g'));
    }

    #[test]
    fn test_next_when_nothing_typed() {
        let hints = KeyHints::project(Some("dog"), "", &MistakeTracker::new(), 3);
        assert_eq!(hints.next, Some('d'));
    }

    #[test]
    fn test_no_next_when_finished() {
        let hints = KeyHints::project(None, "", &tracker("x"), 3);
        assert_eq!(hints.next, None);
        assert_eq!(hints.weak, vec!['x']);
    }

    #[test]
    fn test_weak_keys_limited_and_without_whitespace() {
        let hints = KeyHints::project(Some("a"), "", &tracker("   abcdefghij"), 3);
        assert_eq!(hints.weak.len(), 3);
        assert!(hints.weak.iter().all(|c| !c.is_whitespace()));
    }

    #[test]
    fn test_next_overrides_weak() {
        let hints = KeyHints {
            next: Some('a'),
            weak: vec!['a', 'b'],
        };

        assert_eq!(hints.highlight_for('a'), Some(KeyHighlight::Next));
        assert_eq!(hints.highlight_for('b'), Some(KeyHighlight::Weak));
        assert_eq!(hints.highlight_for('c'), None);
    }

    #[test]
    fn test_highlight_ignores_case() {
        let hints = KeyHints {
            next: Some('T'),
            weak: vec!['ø'],
        };

        assert_eq!(hints.highlight_for('t'), Some(KeyHighlight::Next));
        assert_eq!(hints.highlight_for('Ø'), Some(KeyHighlight::Weak));
    }
}
