use chrono::{DateTime, Local, TimeDelta, Utc};

/// Formats an elapsed duration as seconds with millisecond precision, e.g. `"0.148s"`.
pub fn format_duration(elapsed: TimeDelta) -> String {
    format!("{:.3}s", elapsed.num_milliseconds() as f64 / 1000.0)
}

pub fn elapsed_since(started_at: DateTime<Utc>) -> String {
    format_duration(Utc::now() - started_at)
}

/// Directory name for one backup run: `backup_YYYYmmdd_HHMMSS`.
pub fn backup_dir_name(at: DateTime<Local>) -> String {
    format!("backup_{}", at.format("%Y%m%d_%H%M%S"))
}

/// Timestamp written into generated file and backup headers.
pub fn header_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
