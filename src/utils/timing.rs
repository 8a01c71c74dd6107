use std::time::Duration;

/// Formats a duration in seconds as `MM:SS.ss`.
///
/// Minutes are not capped at 59, so an hour renders as `60:00.00`.
pub fn format_execution_time(execution_time: f64) -> String {
    let minutes = (execution_time / 60.0).floor() as i64;
    let seconds = execution_time.rem_euclid(60.0);
    format!("{minutes:02}:{seconds:05.2}")
}

pub fn format_duration(elapsed: Duration) -> String {
    format_execution_time(elapsed.as_secs_f64())
}
