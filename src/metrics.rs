/// One "word" is five characters, the conventional typing-speed unit.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Per-position comparison result between a target line and what was typed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Pending,
    Correct,
    Incorrect,
}

/// Words per minute for `chars_typed` characters over `elapsed_secs` seconds.
pub fn wpm(chars_typed: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }

    let words = chars_typed as f64 / CHARS_PER_WORD;
    let minutes = elapsed_secs / 60.0;

    words / minutes
}

/// Percentage of positions where `typed` matches `target`.
///
/// The denominator is the longer of the two strings, so both missing and
/// surplus characters lower the score.
pub fn accuracy(target: &str, typed: &str) -> f64 {
    if target.is_empty() {
        return 100.0;
    }
    if typed.is_empty() {
        return 0.0;
    }

    let correct = target
        .chars()
        .zip(typed.chars())
        .filter(|(expected, actual)| expected == actual)
        .count();
    let total = target.chars().count().max(typed.chars().count());

    (correct as f64 / total as f64) * 100.0
}

pub fn char_status(target: &str, typed: &str, position: usize) -> CharStatus {
    let Some(actual) = typed.chars().nth(position) else {
        return CharStatus::Pending;
    };

    match target.chars().nth(position) {
        Some(expected) if expected == actual => CharStatus::Correct,
        _ => CharStatus::Incorrect,
    }
}

/// Status of every position of a line, covering overflow past the target's end.
pub fn line_statuses(target: &str, typed: &str) -> Vec<CharStatus> {
    let target: Vec<char> = target.chars().collect();
    let typed: Vec<char> = typed.chars().collect();
    let len = target.len().max(typed.len());

    (0..len)
        .map(|idx| match (target.get(idx), typed.get(idx)) {
            (_, None) => CharStatus::Pending,
            (Some(expected), Some(actual)) if expected == actual => CharStatus::Correct,
            _ => CharStatus::Incorrect,
        })
        .collect()
}

/// Short encouragement shown next to the final results
pub fn performance_message(wpm: f64, accuracy: f64) -> &'static str {
    if accuracy < 80.0 {
        "Focus on accuracy! Speed will come with practice."
    } else if wpm < 20.0 {
        "Good start! Keep practicing to build speed."
    } else if wpm < 40.0 {
        "Nice progress! You're building good habits."
    } else if wpm < 60.0 {
        "Great job! You're typing with confidence."
    } else {
        "Excellent! You're a typing master!"
    }
}
