use std::time::Instant;
use tracing::debug;

use crate::mistakes::MistakeTracker;

/// What an input-change event did to the line cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProgress {
    /// Session already over or cursor past the last line
    Ignored,
    InProgress,
    /// Current line accepted, cursor moved to the next one
    Advanced,
    /// Last line accepted, cursor is now at `line_count`
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub line_index: usize,
    /// Accepted input of every line already advanced past
    pub completed_text: String,
    pub current_typed: String,
    /// Buffer as of the previous event; only used to spot an appended char
    pub previous_typed: String,
    pub mistake_count: usize,
    pub mistakes: MistakeTracker,
    pub started_at: Option<Instant>,
    pub exercise_completed: bool,
    // Last values computed on tick
    pub elapsed_secs: f64,
    pub current_wpm: f64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn typed_chars(&self) -> usize {
        self.completed_text.chars().count() + self.current_typed.chars().count()
    }

    /// Replace the current line buffer with `new_text` and advance when the
    /// line has enough characters.
    ///
    /// Only a character appended at the previous buffer's end is checked
    /// against the target; shrinking the buffer never counts as a mistake.
    pub fn apply_input(&mut self, lines: &[String], new_text: &str) -> LineProgress {
        if self.exercise_completed {
            return LineProgress::Ignored;
        }
        let Some(line) = lines.get(self.line_index) else {
            return LineProgress::Ignored;
        };

        let prev_len = self.previous_typed.chars().count();
        let new_len = new_text.chars().count();

        if new_len > prev_len {
            let expected = line.chars().nth(prev_len);
            let actual = new_text.chars().nth(prev_len);
            if let (Some(expected), Some(actual)) = (expected, actual) {
                if expected != actual {
                    self.mistake_count += 1;
                    self.mistakes.record(expected);
                    debug!(
                        line = self.line_index,
                        position = prev_len,
                        %expected,
                        %actual,
                        "mistake"
                    );
                }
            }
        }

        self.previous_typed = new_text.to_string();
        self.current_typed = new_text.to_string();

        if new_len < line.chars().count() {
            return LineProgress::InProgress;
        }

        let accepted = std::mem::take(&mut self.current_typed);
        self.completed_text.push_str(&accepted);
        self.previous_typed.clear();
        self.line_index += 1;

        if self.line_index == lines.len() {
            LineProgress::Finished
        } else {
            LineProgress::Advanced
        }
    }
}
