use chrono::{DateTime, Utc};

/// Relative date label for library cards: today, yesterday, N days/weeks/months
/// ago, or the calendar date past a year.
pub fn format_date_smart(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(date) = date else {
        return "-".to_string();
    };
    let days = (now - date).num_days();
    match days {
        d if d <= 0 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 7 => format!("{} days ago", d),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d if d < 365 => format!("{} months ago", d / 30),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M:%S").to_string()
}
