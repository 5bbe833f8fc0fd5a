use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::exercise::Exercise;
use crate::hints::KeyHints;
use crate::layout::KeyboardLayout;
use crate::metrics::{self, CharStatus};
use crate::mistakes::WEAK_KEY_COUNT;
use crate::runtime::{Clock, TickHandle, TickScheduler};
use crate::session::{LineProgress, SessionState};
use crate::time_series::WpmHistory;

pub const TICK_RATE_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NoLines,
    EmptyLine { index: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLines => write!(f, "exercise has no lines to type"),
            Self::EmptyLine { index } => write!(f, "exercise line {} is empty", index + 1),
        }
    }
}

impl std::error::Error for SessionError {}

/// Final record of a completed exercise
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResults {
    pub exercise_id: String,
    pub title: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub mistake_count: usize,
}

impl SessionResults {
    pub fn performance_message(&self) -> &'static str {
        metrics::performance_message(self.wpm, self.accuracy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Ignored,
    Updated,
    LineAdvanced { line_index: usize },
    /// Returned exactly once, by the event that finished the last line
    Completed(SessionResults),
}

/// Everything the presentation layer needs to draw the typing screen
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub exercise_id: String,
    pub title: String,
    pub layout: KeyboardLayout,
    pub current_line: Option<String>,
    pub statuses: Vec<CharStatus>,
    pub typed: String,
    pub line_index: usize,
    pub line_count: usize,
    pub lines_left: usize,
    pub elapsed_secs: f64,
    pub wpm: f64,
    pub mistake_count: usize,
    pub hints: KeyHints,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    pub weak_key_count: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_RATE_MS),
            weak_key_count: WEAK_KEY_COUNT,
        }
    }
}

/// Drives one run through an exercise.
///
/// State only changes through `on_input_changed` and `on_tick`. The tick is
/// scheduled on the first non-empty input and cancelled on completion or
/// `cancel`; dropping the controller drops (and so cancels) the handle too.
#[derive(Debug)]
pub struct SessionController<S: TickScheduler, C: Clock> {
    exercise: Exercise,
    state: SessionState,
    options: SessionOptions,
    scheduler: S,
    clock: C,
    timer: Option<TickHandle>,
    results: Option<SessionResults>,
    history: WpmHistory,
}

impl<S: TickScheduler, C: Clock> SessionController<S, C> {
    pub fn start(exercise: Exercise, scheduler: S, clock: C) -> Result<Self, SessionError> {
        Self::with_options(exercise, scheduler, clock, SessionOptions::default())
    }

    pub fn with_options(
        exercise: Exercise,
        scheduler: S,
        clock: C,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        if exercise.lines.is_empty() {
            return Err(SessionError::NoLines);
        }
        if let Some(index) = exercise.lines.iter().position(|line| line.is_empty()) {
            return Err(SessionError::EmptyLine { index });
        }

        info!(
            exercise = %exercise.id,
            lines = exercise.line_count(),
            layout = %exercise.layout,
            "session started"
        );

        Ok(Self {
            exercise,
            state: SessionState::new(),
            options,
            scheduler,
            clock,
            timer: None,
            results: None,
            history: WpmHistory::new(),
        })
    }

    /// Handle the full current text of the input field for the active line.
    pub fn on_input_changed(&mut self, new_text: &str) -> InputOutcome {
        if self.state.exercise_completed || self.state.line_index >= self.exercise.line_count() {
            return InputOutcome::Ignored;
        }

        if !new_text.is_empty() && !self.state.has_started() {
            self.start_timer();
        }

        match self.state.apply_input(&self.exercise.lines, new_text) {
            LineProgress::Ignored => InputOutcome::Ignored,
            LineProgress::InProgress => InputOutcome::Updated,
            LineProgress::Advanced => {
                debug!(
                    line_index = self.state.line_index,
                    mistakes = self.state.mistake_count,
                    "line advanced"
                );
                InputOutcome::LineAdvanced {
                    line_index: self.state.line_index,
                }
            }
            LineProgress::Finished => InputOutcome::Completed(self.finalize()),
        }
    }

    /// Refresh the live elapsed time and WPM. Does nothing before the first
    /// keystroke or after completion.
    pub fn on_tick(&mut self) {
        if self.state.exercise_completed {
            return;
        }
        let Some(started_at) = self.state.started_at else {
            return;
        };

        let elapsed = self
            .clock
            .now()
            .saturating_duration_since(started_at)
            .as_secs_f64();
        self.state.elapsed_secs = elapsed;
        self.state.current_wpm = metrics::wpm(self.state.typed_chars(), elapsed);
        self.history.record(elapsed, self.state.current_wpm);
    }

    /// Abandon the session. No results are produced.
    pub fn cancel(mut self) {
        self.stop_timer();
        if !self.state.exercise_completed {
            debug!(
                exercise = %self.exercise.id,
                line_index = self.state.line_index,
                "session cancelled"
            );
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let state = &self.state;
        let current_line = if state.exercise_completed {
            None
        } else {
            self.exercise.lines.get(state.line_index)
        };

        let statuses = current_line
            .map(|line| metrics::line_statuses(line, &state.current_typed))
            .unwrap_or_default();
        let hints = KeyHints::project(
            current_line.map(String::as_str),
            &state.current_typed,
            &state.mistakes,
            self.options.weak_key_count,
        );

        RenderSnapshot {
            exercise_id: self.exercise.id.clone(),
            title: self.exercise.title.clone(),
            layout: self.exercise.layout,
            current_line: current_line.cloned(),
            statuses,
            typed: state.current_typed.clone(),
            line_index: state.line_index,
            line_count: self.exercise.line_count(),
            lines_left: self.exercise.line_count() - state.line_index,
            elapsed_secs: state.elapsed_secs,
            wpm: state.current_wpm,
            mistake_count: state.mistake_count,
            hints,
            completed: state.exercise_completed,
        }
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    pub fn wpm_history(&self) -> &WpmHistory {
        &self.history
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn has_started(&self) -> bool {
        self.state.has_started()
    }

    pub fn is_completed(&self) -> bool {
        self.state.exercise_completed
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_cancelled())
    }

    fn start_timer(&mut self) {
        self.state.started_at = Some(self.clock.now());
        self.timer = Some(self.scheduler.schedule_repeating(self.options.tick_interval));
        debug!(interval_ms = self.options.tick_interval.as_millis() as u64, "timer started");
    }

    fn stop_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn finalize(&mut self) -> SessionResults {
        self.stop_timer();
        self.state.exercise_completed = true;

        let elapsed = self
            .state
            .started_at
            .map_or(0.0, |started| {
                self.clock.now().saturating_duration_since(started).as_secs_f64()
            });
        let wpm = metrics::wpm(self.state.completed_text.chars().count(), elapsed);
        let accuracy = metrics::accuracy(&self.exercise.text(), &self.state.completed_text);

        self.state.elapsed_secs = elapsed;
        self.state.current_wpm = wpm;

        let results = SessionResults {
            exercise_id: self.exercise.id.clone(),
            title: self.exercise.title.clone(),
            wpm,
            accuracy,
            elapsed_secs: elapsed,
            mistake_count: self.state.mistake_count,
        };

        info!(
            exercise = %results.exercise_id,
            wpm = results.wpm,
            accuracy = results.accuracy,
            elapsed_secs = results.elapsed_secs,
            mistakes = results.mistake_count,
            "exercise completed"
        );

        self.results = Some(results.clone());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ManualClock, ManualTickScheduler};
    use assert_matches::assert_matches;

    type TestController = SessionController<ManualTickScheduler, ManualClock>;

    fn controller(lines: &[&str]) -> (TestController, ManualTickScheduler, ManualClock) {
        let scheduler = ManualTickScheduler::new();
        let clock = ManualClock::new();
        let exercise = Exercise::new("test", "Test", lines.iter().copied(), KeyboardLayout::English);
        let ctrl = SessionController::start(exercise, scheduler.clone(), clock.clone()).unwrap();
        (ctrl, scheduler, clock)
    }

    fn type_line(ctrl: &mut TestController, text: &str) -> InputOutcome {
        let mut buf = String::new();
        let mut outcome = InputOutcome::Ignored;
        for c in text.chars() {
            buf.push(c);
            outcome = ctrl.on_input_changed(&buf);
        }
        outcome
    }

    #[test]
    fn test_start_rejects_no_lines() {
        let exercise = Exercise::new("e", "E", Vec::<String>::new(), KeyboardLayout::English);
        let result = SessionController::start(exercise, ManualTickScheduler::new(), ManualClock::new());
        assert_matches!(result, Err(SessionError::NoLines));
    }

    #[test]
    fn test_start_rejects_empty_line() {
        let exercise = Exercise::new("e", "E", ["ok", ""], KeyboardLayout::English);
        let result = SessionController::start(exercise, ManualTickScheduler::new(), ManualClock::new());
        assert_matches!(result, Err(SessionError::EmptyLine { index: 1 }));
    }

    #[test]
    fn test_initial_snapshot() {
        let (ctrl, scheduler, _) = controller(&["cat", "dog"]);
        let snap = ctrl.snapshot();

        assert_eq!(snap.current_line.as_deref(), Some("cat"));
        assert_eq!(snap.statuses, vec![CharStatus::Pending; 3]);
        assert_eq!(snap.lines_left, 2);
        assert_eq!(snap.hints.next, Some('c'));
        assert!(snap.hints.weak.is_empty());
        assert!(!snap.completed);
        assert!(!ctrl.has_started());
        assert_eq!(scheduler.scheduled(), 0);
    }

    #[test]
    fn test_timer_starts_once_on_first_non_empty_input() {
        let (mut ctrl, scheduler, _) = controller(&["cat"]);

        assert_eq!(ctrl.on_input_changed(""), InputOutcome::Updated);
        assert!(!ctrl.has_started());

        ctrl.on_input_changed("c");
        ctrl.on_input_changed("");
        ctrl.on_input_changed("c");

        assert!(ctrl.has_started());
        assert!(ctrl.is_timer_running());
        assert_eq!(scheduler.scheduled(), 1);
    }

    #[test]
    fn test_tick_before_start_is_ignored() {
        let (mut ctrl, _, clock) = controller(&["cat"]);
        clock.advance(Duration::from_secs(5));

        ctrl.on_tick();

        assert_eq!(ctrl.snapshot().elapsed_secs, 0.0);
        assert!(ctrl.wpm_history().is_empty());
    }

    #[test]
    fn test_tick_updates_live_stats() {
        let (mut ctrl, _, clock) = controller(&["the quick brown fox jumps"]);
        type_line(&mut ctrl, "the quick"); // 9 chars

        clock.advance(Duration::from_secs(6));
        ctrl.on_tick();

        let snap = ctrl.snapshot();
        assert_eq!(snap.elapsed_secs, 6.0);
        assert!((snap.wpm - 18.0).abs() < 1e-9);
        assert_eq!(ctrl.wpm_history().len(), 1);
    }

    #[test]
    fn test_history_is_sampled_once_per_second() {
        let (mut ctrl, _, clock) = controller(&["the quick brown fox jumps"]);
        type_line(&mut ctrl, "the");

        for _ in 0..12 {
            clock.advance(Duration::from_millis(250));
            ctrl.on_tick();
        }

        assert_eq!(ctrl.snapshot().elapsed_secs, 3.0);
        let times: Vec<f64> = ctrl.wpm_history().points().iter().map(|p| p.t).collect();
        assert_eq!(times, vec![0.25, 1.25, 2.25]);
    }

    #[test]
    fn test_live_stats_stale_between_ticks() {
        let (mut ctrl, _, clock) = controller(&["abcdef"]);
        ctrl.on_input_changed("a");
        clock.advance(Duration::from_secs(1));
        ctrl.on_tick();
        let before = ctrl.snapshot().wpm;

        ctrl.on_input_changed("ab");
        assert_eq!(ctrl.snapshot().wpm, before);
    }

    #[test]
    fn test_cat_dog_walkthrough() {
        let (mut ctrl, scheduler, clock) = controller(&["cat", "dog"]);

        assert_eq!(type_line(&mut ctrl, "cat"), InputOutcome::LineAdvanced { line_index: 1 });
        let snap = ctrl.snapshot();
        assert_eq!(snap.lines_left, 1);
        assert_eq!(snap.current_line.as_deref(), Some("dog"));
        assert!(snap.typed.is_empty());

        clock.advance(Duration::from_secs(12));
        let outcome = type_line(&mut ctrl, "dog");

        let results = assert_matches!(outcome, InputOutcome::Completed(r) => r);
        assert_eq!(results.accuracy, 100.0);
        assert_eq!(results.mistake_count, 0);
        assert_eq!(results.elapsed_secs, 12.0);
        assert!((results.wpm - 6.0).abs() < 1e-9); // 6 chars in 12s
        assert_eq!(ctrl.results(), Some(&results));
        assert!(!ctrl.is_timer_running());
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn test_bat_dog_counts_one_mistake() {
        let (mut ctrl, _, _) = controller(&["cat", "dog"]);

        type_line(&mut ctrl, "bat");
        let results = assert_matches!(type_line(&mut ctrl, "dog"), InputOutcome::Completed(r) => r);

        assert_eq!(results.mistake_count, 1);
        assert_eq!(ctrl.state().mistakes.count('c'), 1);
        assert!((results.accuracy - 5.0 / 6.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_completed_session_is_frozen() {
        let (mut ctrl, _, clock) = controller(&["ab"]);
        type_line(&mut ctrl, "ab");
        let results = ctrl.results().cloned();
        let snap = ctrl.snapshot();

        clock.advance(Duration::from_secs(30));
        assert_eq!(ctrl.on_input_changed("x"), InputOutcome::Ignored);
        assert_eq!(ctrl.on_input_changed(""), InputOutcome::Ignored);
        ctrl.on_tick();

        assert_eq!(ctrl.results().cloned(), results);
        assert_eq!(ctrl.snapshot(), snap);
    }

    #[test]
    fn test_snapshot_after_completion() {
        let (mut ctrl, _, _) = controller(&["a"]);
        ctrl.on_input_changed("a");
        let snap = ctrl.snapshot();

        assert!(snap.completed);
        assert_eq!(snap.current_line, None);
        assert!(snap.statuses.is_empty());
        assert_eq!(snap.hints.next, None);
        assert_eq!(snap.lines_left, 0);
    }

    #[test]
    fn test_snapshot_statuses_and_weak_keys() {
        let (mut ctrl, _, _) = controller(&["hello world"]);
        ctrl.on_input_changed("j");
        ctrl.on_input_changed("je");

        let snap = ctrl.snapshot();
        assert_eq!(snap.statuses[0], CharStatus::Incorrect);
        assert_eq!(snap.statuses[1], CharStatus::Correct);
        assert_eq!(snap.statuses[2], CharStatus::Pending);
        assert_eq!(snap.hints.next, Some('l'));
        assert_eq!(snap.hints.weak, vec!['h']);
        assert_eq!(snap.mistake_count, 1);
    }

    #[test]
    fn test_cancel_stops_timer_without_results() {
        let (mut ctrl, scheduler, _) = controller(&["cat", "dog"]);
        ctrl.on_input_changed("c");
        assert_eq!(scheduler.active(), 1);

        ctrl.cancel();

        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn test_dropping_controller_stops_timer() {
        let (mut ctrl, scheduler, _) = controller(&["cat"]);
        ctrl.on_input_changed("c");

        drop(ctrl);

        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn test_custom_weak_key_count() {
        let scheduler = ManualTickScheduler::new();
        let exercise = Exercise::new("w", "W", ["abcdef"], KeyboardLayout::English);
        let options = SessionOptions {
            weak_key_count: 1,
            ..SessionOptions::default()
        };
        let mut ctrl =
            SessionController::with_options(exercise, scheduler, ManualClock::new(), options)
                .unwrap();

        ctrl.on_input_changed("x");
        ctrl.on_input_changed("xx");

        assert_eq!(ctrl.snapshot().hints.weak, vec!['a']);
    }

    #[test]
    fn test_session_error_display() {
        assert_eq!(SessionError::NoLines.to_string(), "exercise has no lines to type");
        assert_eq!(
            SessionError::EmptyLine { index: 0 }.to_string(),
            "exercise line 1 is empty"
        );
    }
}
