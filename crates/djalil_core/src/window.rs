//! Calendar windows used as inclusive range filters on record dates.
//!
//! # Responsibility
//! - Compute day/week/month `[start, end]` bounds around a reference instant.
//! - Normalize calendar-day selections to a fixed noon instant.
//!
//! # Invariants
//! - Bounds are inclusive epoch milliseconds: `start` is 00:00:00.000 of the
//!   first day, `end` is 23:59:59.999 of the last day.
//! - Weeks run Monday through Sunday.
//! - All calendar math happens in the timezone of the reference instant.
//!   Local times skipped by a DST gap resolve forward for start bounds and
//!   backward for end bounds.

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const DST_PROBE_STEP_MINUTES: i64 = 30;
const DST_PROBE_STEPS: i64 = 6;

/// Window granularity for stats and calendar aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    #[default]
    Day,
    Week,
    Month,
}

impl WindowMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }
}

impl Display for WindowMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `[start, end]` range in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn contains(&self, instant: i64) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Computes the window of `mode` that contains `now`.
pub fn window<Tz: TimeZone>(mode: WindowMode, now: &DateTime<Tz>) -> TimeWindow {
    let tz = now.timezone();
    let today = now.date_naive();
    let (first, last) = match mode {
        WindowMode::Day => (today, today),
        WindowMode::Week => {
            let from_monday = u64::from(today.weekday().num_days_from_monday());
            let monday = today.checked_sub_days(Days::new(from_monday)).unwrap_or(today);
            let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
            (monday, sunday)
        }
        WindowMode::Month => {
            let first = today.with_day(1).unwrap_or(today);
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(today);
            (first, last)
        }
    };
    span(&tz, first, last)
}

/// Window covering a single calendar day in `tz`.
pub fn day_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> TimeWindow {
    span(tz, date, date)
}

/// Noon of `date` in `tz`, used when a task is created from a day selection.
pub fn noon_of<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::hours(12);
    resolve_earliest(tz, naive)
}

/// Converts an epoch-millisecond instant into `tz`.
pub fn local_instant<Tz: TimeZone>(instant: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    match tz.timestamp_millis_opt(instant) {
        LocalResult::Single(value) => Some(value),
        LocalResult::Ambiguous(early, _) => Some(early),
        LocalResult::None => None,
    }
}

fn span<Tz: TimeZone>(tz: &Tz, first: NaiveDate, last: NaiveDate) -> TimeWindow {
    let start_naive = first.and_time(NaiveTime::MIN);
    let end_naive = last.and_time(NaiveTime::MIN) + Duration::milliseconds(MILLIS_PER_DAY - 1);
    TimeWindow {
        start: resolve_earliest(tz, start_naive).timestamp_millis(),
        end: resolve_latest(tz, end_naive).timestamp_millis(),
    }
}

fn resolve_earliest<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    for step in 0..=DST_PROBE_STEPS {
        let probe = naive + Duration::minutes(step * DST_PROBE_STEP_MINUTES);
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(value) => return value,
            LocalResult::Ambiguous(early, _) => return early,
            LocalResult::None => continue,
        }
    }
    tz.from_utc_datetime(&naive)
}

fn resolve_latest<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    for step in 0..=DST_PROBE_STEPS {
        let probe = naive - Duration::minutes(step * DST_PROBE_STEP_MINUTES);
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(value) => return value,
            LocalResult::Ambiguous(_, late) => return late,
            LocalResult::None => continue,
        }
    }
    tz.from_utc_datetime(&naive)
}

#[cfg(test)]
mod tests {
    use super::{day_window, noon_of, window, TimeWindow, WindowMode};
    use chrono::{FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

    fn millis<Tz: TimeZone>(tz: &Tz, y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        tz.with_ymd_and_hms(y, m, d, h, mi, s)
            .single()
            .expect("unambiguous test datetime")
            .timestamp_millis()
    }

    #[test]
    fn week_window_runs_monday_through_sunday() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // 2026-10-14 is a Wednesday
        let now = tz.with_ymd_and_hms(2026, 10, 14, 15, 30, 0).single().unwrap();
        let week = window(WindowMode::Week, &now);
        assert_eq!(week.start, millis(&tz, 2026, 10, 12, 0, 0, 0));
        assert_eq!(week.end, millis(&tz, 2026, 10, 18, 23, 59, 59) + 999);
    }

    #[test]
    fn week_window_on_monday_and_sunday_stays_in_same_week() {
        let monday = Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).single().unwrap();
        let sunday = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).single().unwrap();
        assert_eq!(
            window(WindowMode::Week, &monday),
            window(WindowMode::Week, &sunday)
        );
    }

    #[test]
    fn day_window_spans_full_local_day() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).single().unwrap();
        let day = window(WindowMode::Day, &now);
        assert_eq!(day.start, millis(&tz, 2026, 3, 1, 0, 0, 0));
        assert_eq!(day.end - day.start, 24 * 60 * 60 * 1000 - 1);
        assert!(day.contains(now.timestamp_millis()));
        assert!(!day.contains(day.end + 1));
    }

    #[test]
    fn month_window_handles_leap_february_and_december() {
        let feb = Utc.with_ymd_and_hms(2028, 2, 10, 8, 0, 0).single().unwrap();
        let month = window(WindowMode::Month, &feb);
        assert_eq!(month.start, millis(&Utc, 2028, 2, 1, 0, 0, 0));
        assert_eq!(month.end, millis(&Utc, 2028, 2, 29, 23, 59, 59) + 999);

        let dec = Utc.with_ymd_and_hms(2026, 12, 31, 8, 0, 0).single().unwrap();
        let month = window(WindowMode::Month, &dec);
        assert_eq!(month.end, millis(&Utc, 2026, 12, 31, 23, 59, 59) + 999);
    }

    #[test]
    fn day_window_matches_day_mode() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).single().unwrap();
        assert_eq!(day_window(date, &Utc), window(WindowMode::Day, &now));
    }

    #[test]
    fn noon_is_inside_its_day() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let noon = noon_of(date, &tz);
        assert_eq!(noon.hour(), 12);
        assert_eq!(noon.date_naive(), date);
        let TimeWindow { start, end } = day_window(date, &tz);
        assert!(start < noon.timestamp_millis() && noon.timestamp_millis() < end);
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(WindowMode::parse(" Week "), Some(WindowMode::Week));
        assert_eq!(WindowMode::parse("year"), None);
    }
}
