use serde::Deserialize;

use gradus_core::{ActivityKind, ActivityRecord, Actor, Chapter, new_id, now_millis};
use gradus_store::Store;

use crate::{ServiceError, ThesisService, require_thesis_advisor, require_thesis_student};

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterCreateRequest {
    pub thesis_id: String,
    pub title: String,
    pub number: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChapterEditRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub number: Option<u32>,
}

impl<S: Store> ThesisService<S> {
    pub fn create_chapter(
        &self,
        actor: &Actor,
        request: ChapterCreateRequest,
    ) -> Result<Chapter, ServiceError> {
        let thesis = self.thesis_by_id(&request.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation(
                "chapter title must not be empty".to_owned(),
            ));
        }

        let chapter = Chapter {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            number: request.number,
            title: title.to_owned(),
            completion_percentage: 0,
            approved: false,
            approved_at: None,
            position: request.number,
        };
        self.store().insert_chapter(&chapter)?;

        self.refresh_overall(&thesis.id);

        Ok(chapter)
    }

    pub fn edit_chapter(
        &self,
        actor: &Actor,
        chapter_id: &str,
        request: ChapterEditRequest,
    ) -> Result<Chapter, ServiceError> {
        let mut chapter = self.chapter_by_id(chapter_id)?;
        let thesis = self.thesis_by_id(&chapter.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        if let Some(title) = request.title {
            let title = title.trim().to_owned();
            if title.is_empty() {
                return Err(ServiceError::Validation(
                    "chapter title must not be empty".to_owned(),
                ));
            }
            chapter.title = title;
        }
        if let Some(number) = request.number {
            chapter.number = number;
        }

        self.store()
            .update_chapter_meta(&chapter.id, &chapter.title, chapter.number)?;

        Ok(chapter)
    }

    pub fn delete_chapter(&self, actor: &Actor, chapter_id: &str) -> Result<(), ServiceError> {
        let chapter = self.chapter_by_id(chapter_id)?;
        let thesis = self.thesis_by_id(&chapter.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        self.store().delete_chapter(&chapter.id)?;
        self.refresh_overall(&thesis.id);

        Ok(())
    }

    // Student-facing progress report; the thesis rollup follows.
    pub fn update_chapter_percentage(
        &self,
        actor: &Actor,
        chapter_id: &str,
        percentage: u8,
    ) -> Result<Chapter, ServiceError> {
        if percentage > 100 {
            return Err(ServiceError::Validation(
                "percentage must be between 0 and 100".to_owned(),
            ));
        }

        let mut chapter = self.chapter_by_id(chapter_id)?;
        let thesis = self.thesis_by_id(&chapter.thesis_id)?;
        require_thesis_student(actor, &thesis)?;

        let previous = chapter.completion_percentage;
        let now = now_millis();
        self.store()
            .set_chapter_percentage(&chapter.id, percentage)?;

        self.record_activity(ActivityRecord {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            kind: ActivityKind::ChapterUpdate,
            description: format!(
                "Updated chapter {}: {} to {}%",
                chapter.number, chapter.title, percentage
            ),
            previous_value: Some(serde_json::json!({
                "chapter_id": chapter.id,
                "percentage": previous,
            })),
            new_value: Some(serde_json::json!({
                "chapter_id": chapter.id,
                "percentage": percentage,
            })),
            recorded_at: now,
        });

        self.refresh_overall(&thesis.id);

        chapter.completion_percentage = percentage;
        Ok(chapter)
    }

    pub fn approve_chapter(&self, actor: &Actor, chapter_id: &str) -> Result<Chapter, ServiceError> {
        let mut chapter = self.chapter_by_id(chapter_id)?;
        let thesis = self.thesis_by_id(&chapter.thesis_id)?;
        require_thesis_advisor(actor, &thesis)?;

        let now = now_millis();
        self.store()
            .set_chapter_approval(&chapter.id, true, Some(now))?;

        self.record_activity(ActivityRecord {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            kind: ActivityKind::ChapterUpdate,
            description: format!("Chapter {} approved by the advisor", chapter.number),
            previous_value: Some(serde_json::json!({ "approved": chapter.approved })),
            new_value: Some(serde_json::json!({ "approved": true })),
            recorded_at: now,
        });

        chapter.approved = true;
        chapter.approved_at = Some(now);
        Ok(chapter)
    }
}
