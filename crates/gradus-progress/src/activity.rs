use chrono::DateTime;
use serde::Serialize;

use gradus_core::{ActivityKind, ActivityRecord, DAY_MS};

const WINDOW_DAYS: i64 = 30;
// A 30-day window holds 4.3 weeks; the weekly average divides by that rather
// than pretending the window is a whole number of weeks.
const WEEKS_PER_WINDOW: f64 = 4.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub total: u64,
    pub last_activity_at: Option<i64>,
    pub weekly_average: f64,
    pub most_frequent_kind: Option<ActivityKind>,
    pub last_30_days: u64,
}

pub fn summarize(activities: &[ActivityRecord], now_ms: i64) -> ActivitySummary {
    let last_30_days = count_in_window(activities, WINDOW_DAYS, now_ms);

    ActivitySummary {
        total: activities.len() as u64,
        last_activity_at: activities.iter().map(|record| record.recorded_at).max(),
        weekly_average: weekly_average(last_30_days),
        most_frequent_kind: most_frequent_kind(activities),
        last_30_days,
    }
}

fn count_in_window(activities: &[ActivityRecord], window_days: i64, now_ms: i64) -> u64 {
    let cutoff = now_ms - window_days * DAY_MS;
    activities
        .iter()
        .filter(|record| record.recorded_at >= cutoff)
        .count() as u64
}

fn weekly_average(last_30_days: u64) -> f64 {
    let value = last_30_days as f64 / WEEKS_PER_WINDOW;
    (value * 10.0).round() / 10.0
}

// Highest count wins; ties go to the kind declared first.
pub fn most_frequent_kind(activities: &[ActivityRecord]) -> Option<ActivityKind> {
    if activities.is_empty() {
        return None;
    }

    let mut best_kind = None;
    let mut best_count = 0usize;
    for kind in ActivityKind::ALL {
        let count = activities
            .iter()
            .filter(|record| record.kind == kind)
            .count();
        if best_kind.is_none() || count > best_count {
            best_kind = Some(kind);
            best_count = count;
        }
    }
    best_kind
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    pub date: String,
    pub count: u64,
}

// Per-UTC-day counts over the trailing window, oldest day first, today
// included.
pub fn daily_counts(activities: &[ActivityRecord], days: i64, now_ms: i64) -> Vec<DailyActivity> {
    let mut buckets = Vec::new();
    for offset in (0..days.max(0)).rev() {
        let date = utc_date_string(now_ms - offset * DAY_MS);
        let count = activities
            .iter()
            .filter(|record| utc_date_string(record.recorded_at) == date)
            .count() as u64;
        buckets.push(DailyActivity { date, count });
    }
    buckets
}

fn utc_date_string(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
