//! Streak and minute aggregation over the activity log
//!
//! Day boundaries are local calendar days in the timezone of the `as_of`
//! instant passed in, so callers use `Local::now()` while tests pin a
//! fixed offset.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::models::{ActivityEntry, ActivitySummary};

/// Length of the rolling "week" window
const WEEK: i64 = 7;

/// Calendar day of an instant in the given timezone
pub fn day_key<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// Distinct calendar days with at least one entry
pub fn active_days<Tz: TimeZone>(entries: &[ActivityEntry], tz: &Tz) -> BTreeSet<NaiveDate> {
    entries.iter().map(|e| day_key(&e.timestamp, tz)).collect()
}

/// Consecutive active days ending on the day of `as_of`.
///
/// If that day has no activity the streak is 0, whatever came before.
pub fn compute_streak<Tz: TimeZone>(entries: &[ActivityEntry], as_of: &DateTime<Tz>) -> u32 {
    let days = active_days(entries, &as_of.timezone());

    let mut streak = 0;
    let mut check_date = as_of.date_naive();
    while days.contains(&check_date) {
        streak += 1;
        match check_date.pred_opt() {
            Some(prev) => check_date = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive active days anywhere in the log
pub fn longest_streak<Tz: TimeZone>(entries: &[ActivityEntry], tz: &Tz) -> u32 {
    let days = active_days(entries, tz);

    let mut longest = 0;
    let mut current = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        current = match prev {
            Some(p) if day - p == Duration::days(1) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        prev = Some(day);
    }
    longest
}

/// Sum of `minutes` over entries matching `predicate`
pub fn sum_minutes<P>(entries: &[ActivityEntry], predicate: P) -> u64
where
    P: Fn(&ActivityEntry) -> bool,
{
    entries
        .iter()
        .filter(|e| predicate(e))
        .map(|e| u64::from(e.minutes))
        .sum()
}

/// Minutes logged on the calendar day of `as_of`
pub fn today_minutes<Tz: TimeZone>(entries: &[ActivityEntry], as_of: &DateTime<Tz>) -> u64 {
    let tz = as_of.timezone();
    let today = as_of.date_naive();
    sum_minutes(entries, |e| day_key(&e.timestamp, &tz) == today)
}

/// Minutes logged within the last 7×24h before `now` (rolling, not a
/// calendar week). Entries stamped in the future are included.
pub fn week_minutes(entries: &[ActivityEntry], now: DateTime<Utc>) -> u64 {
    let window = Duration::days(WEEK);
    sum_minutes(entries, |e| now.signed_duration_since(e.timestamp) <= window)
}

/// Dashboard totals as of `now`
pub fn summarize<Tz: TimeZone>(entries: &[ActivityEntry], now: &DateTime<Tz>) -> ActivitySummary {
    ActivitySummary {
        streak_days: compute_streak(entries, now),
        longest_streak: longest_streak(entries, &now.timezone()),
        today_minutes: today_minutes(entries, now),
        week_minutes: week_minutes(entries, now.with_timezone(&Utc)),
        total_entries: entries.len(),
    }
}
