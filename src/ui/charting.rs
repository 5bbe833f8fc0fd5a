use touchtype::time_series::WpmHistory;

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(history: &WpmHistory, elapsed_secs: f64) -> (f64, f64) {
    let highest_wpm = history.peak().unwrap_or(0.0).max(1.0);
    let overall_duration = history.duration().max(elapsed_secs).max(1.0);

    (overall_duration, highest_wpm.ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
