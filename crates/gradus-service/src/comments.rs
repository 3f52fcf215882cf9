use serde::Deserialize;

use gradus_core::{ActivityKind, ActivityRecord, Actor, Comment, new_id, now_millis};
use gradus_store::Store;

use crate::{ServiceError, ThesisService, require_participant};

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreateRequest {
    pub chapter_id: String,
    pub body: String,
}

impl<S: Store> ThesisService<S> {
    pub fn create_comment(
        &self,
        actor: &Actor,
        request: CommentCreateRequest,
    ) -> Result<Comment, ServiceError> {
        let body = request.body.trim();
        if body.is_empty() {
            return Err(ServiceError::Validation(
                "comment body must not be empty".to_owned(),
            ));
        }

        let chapter = self.chapter_by_id(&request.chapter_id)?;
        let thesis = self.thesis_by_id(&chapter.thesis_id)?;
        require_participant(actor, &thesis)?;

        let comment = Comment {
            id: new_id(),
            chapter_id: chapter.id.clone(),
            author_id: actor.user_id.clone(),
            body: body.to_owned(),
            created_at: now_millis(),
        };
        self.store().insert_comment(&comment)?;

        // Student comments stay out of the feed; advisor feedback is the
        // signal the roster surfaces.
        if actor.is_advisor() {
            self.record_activity(ActivityRecord {
                id: new_id(),
                thesis_id: thesis.id.clone(),
                kind: ActivityKind::ChapterUpdate,
                description: format!("New advisor comment on chapter {}", chapter.number),
                previous_value: None,
                new_value: None,
                recorded_at: comment.created_at,
            });
        }

        Ok(comment)
    }
}
