/// Live WPM sampled at `t` seconds into the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Minimum spacing between chart samples, in seconds
pub const SAMPLE_INTERVAL_SECS: f64 = 1.0;

/// WPM samples taken from timer ticks, in time order, at most one per
/// sample interval
#[derive(Debug, Clone, PartialEq)]
pub struct WpmHistory {
    points: Vec<TimeSeriesPoint>,
    interval: f64,
}

impl Default for WpmHistory {
    fn default() -> Self {
        Self::with_interval(SAMPLE_INTERVAL_SECS)
    }
}

impl WpmHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(interval: f64) -> Self {
        Self {
            points: Vec::new(),
            interval: interval.max(0.0),
        }
    }

    /// The first sample is always kept. Later ones are dropped unless they
    /// are at least one interval after the last kept sample.
    pub fn record(&mut self, t: f64, wpm: f64) {
        if self
            .points
            .last()
            .is_some_and(|last| t < last.t || t - last.t < self.interval)
        {
            return;
        }
        self.points.push(TimeSeriesPoint::new(t, wpm));
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn peak(&self) -> Option<f64> {
        self.points.iter().map(|p| p.wpm).reduce(f64::max)
    }

    pub fn duration(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.t)
    }

    pub fn as_tuples(&self) -> Vec<(f64, f64)> {
        self.points.iter().copied().map(Into::into).collect()
    }
}
