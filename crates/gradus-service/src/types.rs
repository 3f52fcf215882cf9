use serde::Serialize;

use gradus_core::{ActivityRecord, AlertLevel, Chapter, Comment, Milestone, Thesis, User};
use gradus_progress::{ActivitySummary, Badge, DailyActivity, RankingEntry, RankingStatistics};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThesisDetail {
    pub thesis: Thesis,
    pub student: User,
    pub advisor: User,
    pub chapters: Vec<ChapterDetail>,
    pub milestones: Vec<Milestone>,
    pub recent_activity: Vec<ActivityRecord>,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub thesis: Thesis,
    pub student: User,
    pub alert: AlertLevel,
    pub last_activity_at: Option<i64>,
    pub activity_last_30_days: u64,
    pub next_milestone: Option<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityFeed {
    pub items: Vec<ActivityRecord>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub summary: ActivitySummary,
    pub daily: Vec<DailyActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingView {
    pub entries: Vec<RankingEntry>,
    pub statistics: RankingStatistics,
    pub programs: Vec<String>,
    pub cohorts: Vec<String>,
}
