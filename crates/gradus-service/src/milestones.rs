use serde::Deserialize;

use gradus_core::{ActivityKind, ActivityRecord, Actor, Milestone, new_id, now_millis};
use gradus_store::Store;

use crate::{ServiceError, ThesisService, require_thesis_advisor, require_thesis_student};

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneCreateRequest {
    pub thesis_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_at: i64,
    #[serde(default)]
    pub chapter_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneEditRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<i64>,
    #[serde(default)]
    pub chapter_id: Option<String>,
}

impl<S: Store> ThesisService<S> {
    pub fn create_milestone(
        &self,
        actor: &Actor,
        request: MilestoneCreateRequest,
    ) -> Result<Milestone, ServiceError> {
        let thesis = self.thesis_by_id(&request.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation(
                "milestone title must not be empty".to_owned(),
            ));
        }
        if let Some(chapter_id) = &request.chapter_id {
            let chapter = self.chapter_by_id(chapter_id)?;
            if chapter.thesis_id != thesis.id {
                return Err(ServiceError::Validation(
                    "chapter belongs to a different thesis".to_owned(),
                ));
            }
        }

        let milestone = Milestone {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            chapter_id: request.chapter_id,
            title: title.to_owned(),
            description: request.description,
            due_at: request.due_at,
            completed: false,
            completed_at: None,
        };
        self.store().insert_milestone(&milestone)?;

        self.record_activity(ActivityRecord {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            kind: ActivityKind::ChapterUpdate,
            description: format!("New milestone created: {}", milestone.title),
            previous_value: None,
            new_value: None,
            recorded_at: now_millis(),
        });

        Ok(milestone)
    }

    pub fn edit_milestone(
        &self,
        actor: &Actor,
        milestone_id: &str,
        request: MilestoneEditRequest,
    ) -> Result<Milestone, ServiceError> {
        let mut milestone = self.milestone_by_id(milestone_id)?;
        let thesis = self.thesis_by_id(&milestone.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        if let Some(title) = request.title {
            let title = title.trim().to_owned();
            if title.is_empty() {
                return Err(ServiceError::Validation(
                    "milestone title must not be empty".to_owned(),
                ));
            }
            milestone.title = title;
        }
        if let Some(description) = request.description {
            milestone.description = Some(description);
        }
        if let Some(due_at) = request.due_at {
            milestone.due_at = due_at;
        }
        if let Some(chapter_id) = request.chapter_id {
            let chapter = self.chapter_by_id(&chapter_id)?;
            if chapter.thesis_id != thesis.id {
                return Err(ServiceError::Validation(
                    "chapter belongs to a different thesis".to_owned(),
                ));
            }
            milestone.chapter_id = Some(chapter_id);
        }

        self.store().update_milestone_meta(
            &milestone.id,
            &milestone.title,
            milestone.description.as_deref(),
            milestone.due_at,
            milestone.chapter_id.as_deref(),
        )?;

        Ok(milestone)
    }

    pub fn delete_milestone(&self, actor: &Actor, milestone_id: &str) -> Result<(), ServiceError> {
        let milestone = self.milestone_by_id(milestone_id)?;
        let thesis = self.thesis_by_id(&milestone.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        self.store().delete_milestone(&milestone.id)?;
        Ok(())
    }

    // Flips completion, so a second call on the same milestone reopens it.
    pub fn toggle_milestone(
        &self,
        actor: &Actor,
        milestone_id: &str,
    ) -> Result<Milestone, ServiceError> {
        let mut milestone = self.milestone_by_id(milestone_id)?;
        let thesis = self.thesis_by_id(&milestone.thesis_id)?;
        require_thesis_student(actor, &thesis)?;

        let previous = milestone.completed;
        let completed = !previous;
        let now = now_millis();
        let completed_at = completed.then_some(now);
        self.store()
            .set_milestone_completion(&milestone.id, completed, completed_at)?;

        let description = if completed {
            format!("Completed milestone: {}", milestone.title)
        } else {
            format!("Reopened milestone: {}", milestone.title)
        };
        self.record_activity(ActivityRecord {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            kind: ActivityKind::MilestoneCompleted,
            description,
            previous_value: Some(serde_json::json!({
                "milestone_id": milestone.id,
                "completed": previous,
            })),
            new_value: Some(serde_json::json!({
                "milestone_id": milestone.id,
                "completed": completed,
            })),
            recorded_at: now,
        });

        milestone.completed = completed;
        milestone.completed_at = completed_at;
        Ok(milestone)
    }
}
