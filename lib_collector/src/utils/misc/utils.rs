use chrono::{SecondsFormat, Utc};

/// # Current Datetime RFC 9557
///
/// Returns the current UTC datetime as an RFC 9557 string, i.e. an RFC 3339
/// timestamp followed by the bracketed time zone annotation.
///
/// Example output: `2026-08-06T14:21:09.042Z[UTC]`
pub fn current_datetime_rfc9557() -> String {
    format!("{}[UTC]", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// # Format Duration HH:MM:SS
///
/// Formats a `std::time::Duration` into an `HH:MM:SS` string for
/// human-readable reports.
pub fn format_duration_hms(dur: std::time::Duration) -> String {
    let total_secs = dur.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc9557_has_utc_suffix() {
        let ts = current_datetime_rfc9557();
        assert!(ts.ends_with("[UTC]"), "unexpected timestamp format: {}", ts);
        assert!(ts.contains('T'));
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_hms(std::time::Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration_hms(std::time::Duration::from_secs(3661)), "01:01:01");
        assert_eq!(format_duration_hms(std::time::Duration::from_secs(86399)), "23:59:59");
    }
}
