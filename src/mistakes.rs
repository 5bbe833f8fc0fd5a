use indexmap::IndexMap;
use itertools::Itertools;

/// Number of weak keys highlighted on the keyboard
pub const WEAK_KEY_COUNT: usize = 3;

/// Counts how often each expected character was mistyped during a session.
///
/// Entries keep first-seen order, which is also the tie-break when ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MistakeTracker {
    counts: IndexMap<char, usize>,
}

impl MistakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one mistake at a position where `expected` was the target char
    pub fn record(&mut self, expected: char) {
        *self.counts.entry(expected).or_insert(0) += 1;
    }

    pub fn count(&self, character: char) -> usize {
        self.counts.get(&character).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn frequencies(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }

    /// Most frequently mistyped characters, skipping whitespace and control chars.
    pub fn top(&self, n: usize) -> Vec<char> {
        self.counts
            .iter()
            .filter(|(c, _)| !c.is_whitespace() && !c.is_control())
            .sorted_by(|a, b| b.1.cmp(a.1))
            .take(n)
            .map(|(c, _)| *c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker = MistakeTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.total(), 0);
        assert_eq!(tracker.count('a'), 0);
        assert!(tracker.top(WEAK_KEY_COUNT).is_empty());
    }

    #[test]
    fn test_record_accumulates() {
        let mut tracker = MistakeTracker::new();
        tracker.record('c');
        tracker.record('c');
        tracker.record('x');

        assert_eq!(tracker.count('c'), 2);
        assert_eq!(tracker.count('x'), 1);
        assert_eq!(tracker.total(), 3);
    }

    #[test]
    fn test_top_ranks_by_frequency() {
        let mut tracker = MistakeTracker::new();
        for c in "abbcccdddd".chars() {
            tracker.record(c);
        }

        assert_eq!(tracker.top(3), vec!['d', 'c', 'b']);
    }

    #[test]
    fn test_top_ties_keep_first_seen_order() {
        let mut tracker = MistakeTracker::new();
        for c in "qwerty".chars() {
            tracker.record(c);
        }

        assert_eq!(tracker.top(3), vec!['q', 'w', 'e']);
    }

    #[test]
    fn test_top_skips_whitespace() {
        let mut tracker = MistakeTracker::new();
        for _ in 0..5 {
            tracker.record(' ');
        }
        tracker.record('\t');
        tracker.record('a');

        assert_eq!(tracker.top(3), vec!['a']);
        assert_eq!(tracker.count(' '), 5);
    }

    #[test]
    fn test_top_never_exceeds_limit() {
        let mut tracker = MistakeTracker::new();
        for c in "abcdefghij".chars() {
            tracker.record(c);
        }

        assert_eq!(tracker.top(WEAK_KEY_COUNT).len(), 3);
    }

    #[test]
    fn test_frequencies_in_first_seen_order() {
        let mut tracker = MistakeTracker::new();
        tracker.record('z');
        tracker.record('a');
        tracker.record('z');

        let freqs: Vec<(char, usize)> = tracker.frequencies().collect();
        assert_eq!(freqs, vec![('z', 2), ('a', 1)]);
    }
}
