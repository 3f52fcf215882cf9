use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type ThesisId = String;
pub type ChapterId = String;
pub type MilestoneId = String;
pub type CommentId = String;
pub type ActivityId = String;

pub const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Advisor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Advisor => "advisor",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "advisor" => Ok(Self::Advisor),
            other => Err(format!("unsupported role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThesisState {
    InProgress,
    UnderReview,
    Completed,
}

impl ThesisState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::UnderReview => "under_review",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ThesisState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "in_progress" => Ok(Self::InProgress),
            "under_review" => Ok(Self::UnderReview),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unsupported thesis state: {other}")),
        }
    }
}

// Declaration order doubles as the tie-break order when ranking kinds by
// frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PercentageUpdate,
    ChapterUpdate,
    MilestoneCompleted,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 3] = [
        ActivityKind::PercentageUpdate,
        ActivityKind::ChapterUpdate,
        ActivityKind::MilestoneCompleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PercentageUpdate => "percentage_update",
            Self::ChapterUpdate => "chapter_update",
            Self::MilestoneCompleted => "milestone_completed",
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "percentage_update" => Ok(Self::PercentageUpdate),
            "chapter_update" => Ok(Self::ChapterUpdate),
            "milestone_completed" => Ok(Self::MilestoneCompleted),
            other => Err(format!("unsupported activity kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Urgent,
    Watch,
    Healthy,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Watch => "watch",
            Self::Healthy => "healthy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub program: String,
    pub cohort: String,
    pub avatar: Option<String>,
    pub hidden_from_ranking: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thesis {
    pub id: ThesisId,
    pub student_id: UserId,
    pub advisor_id: UserId,
    pub title: String,
    pub overall_percentage: u8,
    pub state: ThesisState,
    pub public_visibility: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub thesis_id: ThesisId,
    pub number: u32,
    pub title: String,
    pub completion_percentage: u8,
    pub approved: bool,
    pub approved_at: Option<i64>,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub thesis_id: ThesisId,
    pub chapter_id: Option<ChapterId>,
    pub title: String,
    pub description: Option<String>,
    pub due_at: i64,
    pub completed: bool,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub chapter_id: ChapterId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub thesis_id: ThesisId,
    pub kind: ActivityKind,
    pub description: String,
    pub previous_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub recorded_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn is_advisor(&self) -> bool {
        self.role == Role::Advisor
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// Whole days from `from_ms` to `to_ms`, floored toward negative infinity so a
// deadline half a day past due counts as -1, not 0.
pub fn days_between(from_ms: i64, to_ms: i64) -> i64 {
    (to_ms - from_ms).div_euclid(DAY_MS)
}
