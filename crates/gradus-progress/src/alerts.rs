use gradus_config::AlertConfig;
use gradus_core::{ActivityRecord, AlertLevel, Milestone, days_between};

// Sentinel for a thesis with no recorded activity. Large enough to trip every
// inactivity threshold.
pub const NO_ACTIVITY_DAYS: i64 = 999;

pub fn days_since_last_activity(activities: &[ActivityRecord], now_ms: i64) -> i64 {
    activities
        .iter()
        .map(|record| record.recorded_at)
        .max()
        .map(|latest| days_between(latest, now_ms))
        .unwrap_or(NO_ACTIVITY_DAYS)
}

// A milestone counts as upcoming when it is incomplete and due within the
// window, today inclusive. Past-due milestones floor to negative days and
// fall out of the range.
pub fn has_upcoming_milestone(milestones: &[Milestone], window_days: i64, now_ms: i64) -> bool {
    milestones.iter().any(|milestone| {
        if milestone.completed {
            return false;
        }
        let days_until = days_between(now_ms, milestone.due_at);
        days_until >= 0 && days_until <= window_days
    })
}

// Rule order is load-bearing; the first match wins.
pub fn classify(
    overall_percentage: u8,
    activities: &[ActivityRecord],
    milestones: &[Milestone],
    config: &AlertConfig,
    now_ms: i64,
) -> AlertLevel {
    let inactive_days = days_since_last_activity(activities, now_ms);
    let upcoming = has_upcoming_milestone(milestones, config.milestone_window_days, now_ms);

    if inactive_days > config.stall_days {
        return AlertLevel::Urgent;
    }
    if overall_percentage < config.low_percent && upcoming {
        return AlertLevel::Urgent;
    }
    if inactive_days >= config.watch_days {
        return AlertLevel::Watch;
    }
    if overall_percentage >= config.low_percent && overall_percentage < config.fair_percent {
        return AlertLevel::Watch;
    }
    AlertLevel::Healthy
}
