mod activity;
mod chapters;
mod comments;
mod error;
mod milestones;
mod ranking;
mod roster;
mod theses;
mod types;
mod users;

#[cfg(test)]
mod fixtures;

pub use activity::ActivityFeedRequest;
pub use chapters::{ChapterCreateRequest, ChapterEditRequest};
pub use comments::CommentCreateRequest;
pub use error::ServiceError;
pub use milestones::{MilestoneCreateRequest, MilestoneEditRequest};
pub use theses::AssignThesisRequest;
pub use types::{
    ActivityFeed, ActivityReport, ChapterDetail, RankingView, RosterEntry, ThesisDetail,
};
pub use users::NewUserRequest;

use gradus_config::AlertConfig;
use gradus_core::{ActivityRecord, Actor, Chapter, Milestone, Thesis, User, now_millis};
use gradus_progress::overall_percentage;
use gradus_store::Store;

pub struct ThesisService<S> {
    store: S,
    alerts: AlertConfig,
}

impl<S> ThesisService<S> {
    pub fn new(store: S, alerts: AlertConfig) -> Self {
        Self { store, alerts }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: Store> ThesisService<S> {
    // Derives the rollup from the current chapter set and persists it. An
    // empty chapter set resolves to zero.
    pub fn recompute_overall(&self, thesis_id: &str) -> Result<u8, ServiceError> {
        let chapters = self.store.list_chapters(thesis_id)?;
        let overall = overall_percentage(&chapters);
        self.store
            .set_overall_percentage(thesis_id, overall, now_millis())?;
        Ok(overall)
    }

    // Rollup refresh after a successful primary change. Failures are logged
    // and swallowed; the stored value self-heals on the next trigger.
    fn refresh_overall(&self, thesis_id: &str) {
        if let Err(err) = self.recompute_overall(thesis_id) {
            tracing::warn!(
                thesis_id = %thesis_id,
                error = %err,
                "failed to recompute overall percentage"
            );
        }
    }

    // Activity appends are secondary effects and never abort the operation
    // that triggered them.
    fn record_activity(&self, record: ActivityRecord) {
        if let Err(err) = self.store.append_activity(&record) {
            tracing::warn!(
                thesis_id = %record.thesis_id,
                kind = record.kind.as_str(),
                error = %err,
                "failed to append activity record"
            );
        }
    }

    fn thesis_by_id(&self, thesis_id: &str) -> Result<Thesis, ServiceError> {
        self.store
            .get_thesis(thesis_id)?
            .ok_or_else(|| ServiceError::not_found("thesis", thesis_id))
    }

    fn chapter_by_id(&self, chapter_id: &str) -> Result<Chapter, ServiceError> {
        self.store
            .get_chapter(chapter_id)?
            .ok_or_else(|| ServiceError::not_found("chapter", chapter_id))
    }

    fn milestone_by_id(&self, milestone_id: &str) -> Result<Milestone, ServiceError> {
        self.store
            .get_milestone(milestone_id)?
            .ok_or_else(|| ServiceError::not_found("milestone", milestone_id))
    }

    fn user_by_id(&self, user_id: &str) -> Result<User, ServiceError> {
        self.store
            .get_user(user_id)?
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }
}

fn require_advisor(actor: &Actor) -> Result<(), ServiceError> {
    if actor.is_advisor() {
        Ok(())
    } else {
        Err(ServiceError::Permission(
            "this operation requires the advisor role".to_owned(),
        ))
    }
}

fn require_thesis_advisor(actor: &Actor, thesis: &Thesis) -> Result<(), ServiceError> {
    require_advisor(actor)?;
    if actor.user_id == thesis.advisor_id {
        Ok(())
    } else {
        Err(ServiceError::Permission(
            "only the assigned advisor can modify this thesis".to_owned(),
        ))
    }
}

fn require_thesis_student(actor: &Actor, thesis: &Thesis) -> Result<(), ServiceError> {
    if actor.user_id == thesis.student_id {
        Ok(())
    } else {
        Err(ServiceError::Permission(
            "only the owning student can perform this operation".to_owned(),
        ))
    }
}

fn require_participant(actor: &Actor, thesis: &Thesis) -> Result<(), ServiceError> {
    if actor.user_id == thesis.student_id || actor.user_id == thesis.advisor_id {
        Ok(())
    } else {
        Err(ServiceError::Permission(
            "only the student or the assigned advisor can view this thesis".to_owned(),
        ))
    }
}
