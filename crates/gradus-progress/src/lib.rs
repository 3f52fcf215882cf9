mod activity;
mod aggregate;
mod alerts;
mod badges;
mod ranking;

pub use activity::{ActivitySummary, DailyActivity, daily_counts, most_frequent_kind, summarize};
pub use aggregate::overall_percentage;
pub use alerts::{NO_ACTIVITY_DAYS, classify, days_since_last_activity, has_upcoming_milestone};
pub use badges::{Badge, unlocked_badges};
pub use ranking::{
    RankingEntry, RankingFilter, RankingStatistics, build_entries, distinct_programs_and_cohorts,
    statistics,
};
