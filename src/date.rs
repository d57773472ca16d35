//! Timestamps for the feed
//!
//! Posts from today show the time only. Older posts show the full date, or,
//! if enabled, how long ago they were posted in years, months and days
//! (`1y2m3d`).

use std::fmt::{Display, Write};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

/// How timestamps are rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRenderPolicy {
    /// strftime format for dates before today
    pub long_format: String,
    /// strftime format for dates today
    pub short_format: String,
    /// -1 never relative, 0 always relative, n relative up to n days
    pub relative_threshold_days: i64,
}

impl Default for DateRenderPolicy {
    fn default() -> Self {
        Self {
            long_format: "%Y-%m-%d %H:%M".to_string(),
            short_format: "%H:%M".to_string(),
            relative_threshold_days: -1,
        }
    }
}

/// Render `status` as seen at `now`. Both should be in the display time zone.
pub fn format<Tz>(status: &DateTime<Tz>, now: &DateTime<Tz>, policy: &DateRenderPolicy) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let status_day = status.date_naive();
    let today = now.date_naive();

    if status_day == today {
        return absolute(status, &policy.short_format);
    }

    let days = today.signed_duration_since(status_day).num_days();
    let relative = match policy.relative_threshold_days {
        _ if days < 0 => false,
        -1 => false,
        0 => true,
        threshold => days <= threshold,
    };

    if relative {
        let (years, months, days) = calendar_diff(status_day, today);
        relative_label(years, months, days)
    } else {
        absolute(status, &policy.long_format)
    }
}

fn absolute<Tz>(time: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    if write!(out, "{}", time.format(format)).is_err() {
        tracing::warn!("Invalid date format {format:?}");
        return time.to_rfc3339();
    }
    out
}

/// Whole years, months and days from `from` to `to` (`from <= to`)
fn calendar_diff(from: NaiveDate, to: NaiveDate) -> (i32, i32, i32) {
    let mut years = to.year() - from.year();
    let mut months = to.month() as i32 - from.month() as i32;
    let mut days = to.day() as i32 - from.day() as i32;

    if days < 0 {
        days += days_in_month(from.year(), from.month());
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }
    (years, months, days)
}

fn days_in_month(year: i32, month: u32) -> i32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day() as i32)
}

/// Leading zero units are dropped, everything after the first shown unit stays
fn relative_label(years: i32, months: i32, days: i32) -> String {
    let mut out = String::new();
    if years > 0 {
        out.push_str(&format!("{years}y"));
    }
    if !out.is_empty() || months > 0 {
        out.push_str(&format!("{months}m"));
    }
    if !out.is_empty() || days > 0 {
        out.push_str(&format!("{days}d"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn policy(threshold: i64) -> DateRenderPolicy {
        DateRenderPolicy {
            relative_threshold_days: threshold,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_day_uses_short_format() {
        let now = at(2024, 5, 20, 12, 0);
        let status = at(2024, 5, 20, 8, 30);
        assert_eq!(format(&status, &now, &policy(-1)), "08:30");
        assert_eq!(format(&status, &now, &policy(0)), "08:30");
        assert_eq!(format(&now, &now, &policy(28)), "12:00");
    }

    #[test]
    fn test_disabled_uses_long_format() {
        let now = at(2024, 5, 20, 12, 0);
        let status = at(2024, 5, 19, 9, 5);
        assert_eq!(format(&status, &now, &policy(-1)), "2024-05-19 09:05");
    }

    #[test]
    fn test_threshold() {
        let now = at(2024, 5, 20, 12, 0);
        let ten_days = at(2024, 5, 10, 9, 0);
        let forty_days = at(2024, 4, 10, 9, 0);
        assert_eq!(format(&ten_days, &now, &policy(28)), "10d");
        assert_eq!(format(&forty_days, &now, &policy(28)), "2024-04-10 09:00");
        // Threshold is inclusive
        assert_eq!(format(&ten_days, &now, &policy(10)), "10d");
        assert_eq!(format(&ten_days, &now, &policy(9)), "2024-05-10 09:00");
    }

    #[test]
    fn test_always_relative() {
        let now = at(2024, 5, 20, 12, 0);
        let status = at(2023, 3, 17, 23, 59);
        assert_eq!(format(&status, &now, &policy(0)), "1y2m3d");
    }

    #[test]
    fn test_lower_units_kept_after_first() {
        let now = at(2024, 5, 20, 12, 0);
        assert_eq!(format(&at(2024, 4, 20, 12, 0), &now, &policy(0)), "1m0d");
        assert_eq!(format(&at(2023, 5, 20, 12, 0), &now, &policy(0)), "1y0m0d");
        assert_eq!(format(&at(2023, 5, 19, 12, 0), &now, &policy(0)), "1y0m1d");
    }

    #[test]
    fn test_calendar_day_boundary() {
        let now = at(2024, 5, 20, 0, 1);
        let status = at(2024, 5, 19, 23, 59);
        assert_eq!(format(&status, &now, &policy(1)), "1d");
    }

    #[test]
    fn test_day_borrow_uses_start_month() {
        let now = at(2024, 3, 1, 12, 0);
        let status = at(2024, 1, 31, 12, 0);
        assert_eq!(format(&status, &now, &policy(0)), "1m1d");
    }

    #[test]
    fn test_future_status_never_relative() {
        let now = at(2024, 5, 20, 12, 0);
        let status = at(2024, 5, 25, 12, 0);
        assert_eq!(format(&status, &now, &policy(28)), "2024-05-25 12:00");
        assert_eq!(format(&status, &now, &policy(0)), "2024-05-25 12:00");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let now = at(2024, 5, 20, 12, 0);
        let status = at(2024, 5, 1, 12, 0);
        let policy = DateRenderPolicy {
            long_format: "%Y-%".to_string(),
            ..Default::default()
        };
        assert_eq!(format(&status, &now, &policy), status.to_rfc3339());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
    }
}
