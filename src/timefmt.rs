use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone};

/// Format a whole-second count as "X时Y分Z秒", omitting zero units.
/// A zero total renders as "0秒".
pub fn format_seconds(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        if minutes > 0 {
            if secs > 0 {
                format!("{}时{}分{}秒", hours, minutes, secs)
            } else {
                format!("{}时{}分", hours, minutes)
            }
        } else if secs > 0 {
            format!("{}时{}秒", hours, secs)
        } else {
            format!("{}时", hours)
        }
    } else if minutes > 0 {
        if secs > 0 {
            format!("{}分{}秒", minutes, secs)
        } else {
            format!("{}分", minutes)
        }
    } else {
        format!("{}秒", secs)
    }
}

/// Parse a clock string in "HH:mm" or "HH:mm:ss" form
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Render a clock value as "HH:mm"
pub fn render_clock(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Seconds between a start and end clock time on the given date.
/// An end time numerically at or before the start is taken to fall on the
/// next calendar day (overnight rollover), so the result is never negative.
pub fn span_seconds(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> i64 {
    let start_dt = date.and_time(start);
    let mut end_dt = date.and_time(end);
    if end <= start {
        end_dt += Duration::days(1);
    }
    (end_dt - start_dt).num_seconds()
}

/// Local timestamp for a date + clock time, resolving DST ambiguity to the
/// earlier instant
pub fn local_datetime(date: NaiveDate, time: NaiveTime) -> chrono::DateTime<Local> {
    match Local.from_local_datetime(&date.and_time(time)) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => {
            // Skipped by a DST gap; nudge forward hour by hour until valid
            let mut probe = date.and_time(time);
            loop {
                probe += Duration::hours(1);
                if let chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) =
                    Local.from_local_datetime(&probe)
                {
                    return dt;
                }
            }
        }
    }
}

/// Human-readable "YYYY-MM-DD" used in storage keys and export markers
pub fn date_key(date: NaiveDate) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}
