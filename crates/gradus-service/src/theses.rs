use serde::Deserialize;

use gradus_core::{
    ActivityKind, ActivityRecord, Actor, Chapter, Comment, DAY_MS, Milestone, Role, Thesis,
    ThesisState, new_id, now_millis,
};
use gradus_progress::unlocked_badges;
use gradus_store::Store;

use crate::types::{ChapterDetail, ThesisDetail};
use crate::{ServiceError, ThesisService, require_advisor, require_participant};

const DEFAULT_CHAPTER_TITLES: [&str; 5] = [
    "Introduction",
    "Theoretical Framework",
    "Methodology",
    "Results",
    "Discussion and Conclusions",
];
const INITIAL_MILESTONE_TITLE: &str = "Proposal submission";
const INITIAL_MILESTONE_LEAD_DAYS: i64 = 30;
const MIN_TITLE_CHARS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct AssignThesisRequest {
    pub student_email: String,
    pub title: String,
}

impl<S: Store> ThesisService<S> {
    // Creates the thesis for a student along with the standard chapter
    // template and an initial proposal milestone.
    pub fn assign_thesis(
        &self,
        actor: &Actor,
        request: AssignThesisRequest,
    ) -> Result<Thesis, ServiceError> {
        require_advisor(actor)?;

        let title = request.title.trim();
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(ServiceError::Validation(format!(
                "thesis title must be at least {MIN_TITLE_CHARS} characters"
            )));
        }
        let email = request.student_email.trim();
        if email.is_empty() {
            return Err(ServiceError::Validation(
                "student email is required".to_owned(),
            ));
        }

        let student = self
            .store()
            .get_user_by_email(email)?
            .ok_or_else(|| ServiceError::not_found("user", email))?;
        if student.role != Role::Student {
            return Err(ServiceError::Validation(format!(
                "user {} is not a student",
                student.email
            )));
        }
        if self.store().get_thesis_by_student(&student.id)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "student {} already has a thesis",
                student.email
            )));
        }

        let now = now_millis();
        let thesis = Thesis {
            id: new_id(),
            student_id: student.id.clone(),
            advisor_id: actor.user_id.clone(),
            title: title.to_owned(),
            overall_percentage: 0,
            state: ThesisState::InProgress,
            public_visibility: true,
            created_at: now,
            updated_at: now,
        };
        self.store().insert_thesis(&thesis)?;

        for (index, chapter_title) in DEFAULT_CHAPTER_TITLES.iter().enumerate() {
            let number = index as u32 + 1;
            self.store().insert_chapter(&Chapter {
                id: new_id(),
                thesis_id: thesis.id.clone(),
                number,
                title: (*chapter_title).to_owned(),
                completion_percentage: 0,
                approved: false,
                approved_at: None,
                position: number,
            })?;
        }

        self.store().insert_milestone(&Milestone {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            chapter_id: None,
            title: INITIAL_MILESTONE_TITLE.to_owned(),
            description: None,
            due_at: now + INITIAL_MILESTONE_LEAD_DAYS * DAY_MS,
            completed: false,
            completed_at: None,
        })?;

        self.refresh_overall(&thesis.id);

        Ok(thesis)
    }

    pub fn my_thesis(&self, actor: &Actor) -> Result<ThesisDetail, ServiceError> {
        let thesis = self
            .store()
            .get_thesis_by_student(&actor.user_id)?
            .ok_or_else(|| ServiceError::not_found("thesis", actor.user_id.as_str()))?;
        self.build_detail(thesis, 10)
    }

    pub fn thesis_detail(
        &self,
        actor: &Actor,
        thesis_id: &str,
    ) -> Result<ThesisDetail, ServiceError> {
        let thesis = self.thesis_by_id(thesis_id)?;
        require_participant(actor, &thesis)?;
        self.build_detail(thesis, 50)
    }

    fn build_detail(
        &self,
        thesis: Thesis,
        activity_limit: u32,
    ) -> Result<ThesisDetail, ServiceError> {
        let student = self.user_by_id(&thesis.student_id)?;
        let advisor = self.user_by_id(&thesis.advisor_id)?;

        let chapters = self.store().list_chapters(&thesis.id)?;
        let mut chapter_details = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            let comments = self.store().list_comments_for_chapter(&chapter.id)?;
            chapter_details.push(ChapterDetail { chapter, comments });
        }

        let milestones = self.store().list_milestones(&thesis.id)?;
        let recent_activity = self
            .store()
            .list_activities(&thesis.id, None, activity_limit, 0)?;
        let total_activities = self.store().count_activities(&thesis.id, None)?;
        let badges = unlocked_badges(thesis.overall_percentage, total_activities);

        Ok(ThesisDetail {
            thesis,
            student,
            advisor,
            chapters: chapter_details,
            milestones,
            recent_activity,
            badges,
        })
    }

    // Sets the rollup directly, bypassing the aggregator until the next
    // chapter-level trigger recomputes it.
    pub fn override_percentage(
        &self,
        actor: &Actor,
        thesis_id: &str,
        percentage: u8,
        justification: &str,
    ) -> Result<Thesis, ServiceError> {
        require_advisor(actor)?;

        let justification = justification.trim();
        if justification.is_empty() {
            return Err(ServiceError::Validation(
                "a justification is required".to_owned(),
            ));
        }
        if percentage > 100 {
            return Err(ServiceError::Validation(
                "percentage must be between 0 and 100".to_owned(),
            ));
        }

        let mut thesis = self.thesis_by_id(thesis_id)?;
        if thesis.advisor_id != actor.user_id {
            return Err(ServiceError::Permission(
                "only the assigned advisor can override the overall percentage".to_owned(),
            ));
        }

        let previous = thesis.overall_percentage;
        let now = now_millis();
        self.store()
            .set_overall_percentage(&thesis.id, percentage, now)?;

        // The override note lands on the earliest chapter so the student sees
        // it in context. A thesis without chapters keeps the override; only
        // the note is skipped.
        match self.store().first_chapter(&thesis.id) {
            Ok(Some(chapter)) => {
                let comment = Comment {
                    id: new_id(),
                    chapter_id: chapter.id,
                    author_id: actor.user_id.clone(),
                    body: override_comment_body(previous, percentage, justification),
                    created_at: now,
                };
                if let Err(err) = self.store().insert_comment(&comment) {
                    tracing::warn!(
                        thesis_id = %thesis.id,
                        error = %err,
                        "failed to record override comment"
                    );
                }
            }
            Ok(None) => {
                tracing::debug!(
                    thesis_id = %thesis.id,
                    "thesis has no chapters; skipping override comment"
                );
            }
            Err(err) => {
                tracing::warn!(
                    thesis_id = %thesis.id,
                    error = %err,
                    "failed to look up anchor chapter for override comment"
                );
            }
        }

        self.record_activity(ActivityRecord {
            id: new_id(),
            thesis_id: thesis.id.clone(),
            kind: ActivityKind::PercentageUpdate,
            description: "Overall percentage updated by the advisor".to_owned(),
            previous_value: Some(serde_json::json!({ "percentage": previous })),
            new_value: Some(serde_json::json!({
                "percentage": percentage,
                "justification": justification,
            })),
            recorded_at: now,
        });

        thesis.overall_percentage = percentage;
        thesis.updated_at = now;
        Ok(thesis)
    }
}

fn override_comment_body(previous: u8, new: u8, justification: &str) -> String {
    format!(
        "**Overall percentage adjusted by the advisor**\n\n\
         Previous percentage: {previous}%\n\
         New percentage: {new}%\n\n\
         Justification: {justification}"
    )
}

#[cfg(test)]
mod tests {
    use gradus_core::{ActivityKind, DAY_MS, Role};
    use gradus_store::Store;

    use crate::fixtures::{actor_for, assigned_thesis, fill_default_chapters, new_user, service};
    use crate::{AssignThesisRequest, ServiceError};

    #[test]
    fn assign_thesis_creates_template_chapters_and_proposal_milestone() {
        let (_temp, service) = service();
        let (_advisor, _student, thesis) = assigned_thesis(&service);

        let chapters = service.store().list_chapters(&thesis.id).expect("chapters");
        assert_eq!(chapters.len(), 5);
        assert_eq!(chapters[0].title, "Introduction");
        assert_eq!(chapters[4].title, "Discussion and Conclusions");
        assert_eq!(
            chapters.iter().map(|c| c.position).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(chapters.iter().all(|c| c.completion_percentage == 0));

        let milestones = service
            .store()
            .list_milestones(&thesis.id)
            .expect("milestones");
        assert_eq!(milestones.len(), 1);
        assert_eq!(milestones[0].title, "Proposal submission");
        assert!(!milestones[0].completed);
        let lead = milestones[0].due_at - thesis.created_at;
        assert_eq!(lead, 30 * DAY_MS);

        assert_eq!(thesis.overall_percentage, 0);
    }

    #[test]
    fn assign_thesis_rejects_short_titles_and_non_students() {
        let (_temp, service) = service();
        let advisor = service
            .create_user(new_user("Advisor", "adv@uni.edu", Role::Advisor))
            .expect("create advisor");
        let advisor = actor_for(&advisor);
        service
            .create_user(new_user("Second Advisor", "adv2@uni.edu", Role::Advisor))
            .expect("create second advisor");

        let short = service.assign_thesis(
            &advisor,
            AssignThesisRequest {
                student_email: "adv2@uni.edu".to_owned(),
                title: "Zip".to_owned(),
            },
        );
        assert!(matches!(short, Err(ServiceError::Validation(_))));

        let not_student = service.assign_thesis(
            &advisor,
            AssignThesisRequest {
                student_email: "adv2@uni.edu".to_owned(),
                title: "A Perfectly Fine Title".to_owned(),
            },
        );
        assert!(matches!(not_student, Err(ServiceError::Validation(_))));

        let unknown = service.assign_thesis(
            &advisor,
            AssignThesisRequest {
                student_email: "ghost@uni.edu".to_owned(),
                title: "A Perfectly Fine Title".to_owned(),
            },
        );
        assert!(matches!(unknown, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn assign_thesis_conflicts_when_student_already_has_one() {
        let (_temp, service) = service();
        let (advisor, _student, _thesis) = assigned_thesis(&service);

        let again = service.assign_thesis(
            &advisor,
            AssignThesisRequest {
                student_email: "student@uni.edu".to_owned(),
                title: "A Second Thesis Title".to_owned(),
            },
        );
        assert!(matches!(again, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn assign_thesis_requires_the_advisor_role() {
        let (_temp, service) = service();
        let student = service
            .create_user(new_user("Student", "stu@uni.edu", Role::Student))
            .expect("create student");

        let denied = service.assign_thesis(
            &actor_for(&student),
            AssignThesisRequest {
                student_email: "stu@uni.edu".to_owned(),
                title: "A Perfectly Fine Title".to_owned(),
            },
        );
        assert!(matches!(denied, Err(ServiceError::Permission(_))));
    }

    #[test]
    fn my_thesis_returns_detail_or_not_found() {
        let (_temp, service) = service();
        let (advisor, student, thesis) = assigned_thesis(&service);

        let detail = service.my_thesis(&student).expect("my thesis");
        assert_eq!(detail.thesis.id, thesis.id);
        assert_eq!(detail.chapters.len(), 5);
        assert_eq!(detail.student.id, student.user_id);
        assert_eq!(detail.advisor.id, advisor.user_id);

        let missing = service.my_thesis(&advisor);
        assert!(matches!(missing, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn thesis_detail_is_limited_to_participants() {
        let (_temp, service) = service();
        let (_advisor, _student, thesis) = assigned_thesis(&service);
        let outsider = service
            .create_user(new_user("Outsider", "out@uni.edu", Role::Student))
            .expect("create outsider");

        let denied = service.thesis_detail(&actor_for(&outsider), &thesis.id);
        assert!(matches!(denied, Err(ServiceError::Permission(_))));

        let missing = service.thesis_detail(&actor_for(&outsider), "no-such-thesis");
        assert!(matches!(missing, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn override_sets_exact_value_and_records_comment_and_activity() {
        let (_temp, service) = service();
        let (advisor, student, thesis) = assigned_thesis(&service);
        fill_default_chapters(&service, &student, &thesis.id);

        let before = service
            .store()
            .get_thesis(&thesis.id)
            .expect("get thesis")
            .expect("thesis exists");
        assert_eq!(before.overall_percentage, 54);

        let updated = service
            .override_percentage(&advisor, &thesis.id, 40, "Adjusted for field work delays")
            .expect("override");
        assert_eq!(updated.overall_percentage, 40);

        let stored = service
            .store()
            .get_thesis(&thesis.id)
            .expect("get thesis")
            .expect("thesis exists");
        assert_eq!(stored.overall_percentage, 40);

        let chapters = service.store().list_chapters(&thesis.id).expect("chapters");
        let first_comments = service
            .store()
            .list_comments_for_chapter(&chapters[0].id)
            .expect("comments");
        assert_eq!(first_comments.len(), 1);
        let body = &first_comments[0].body;
        assert!(body.contains("Previous percentage: 54%"));
        assert!(body.contains("New percentage: 40%"));
        assert!(body.contains("Adjusted for field work delays"));
        for chapter in &chapters[1..] {
            let others = service
                .store()
                .list_comments_for_chapter(&chapter.id)
                .expect("comments");
            assert!(others.is_empty());
        }

        let overrides = service
            .store()
            .list_activities(&thesis.id, Some(ActivityKind::PercentageUpdate), 10, 0)
            .expect("activities");
        assert_eq!(overrides.len(), 1);
        assert_eq!(
            overrides[0].previous_value,
            Some(serde_json::json!({ "percentage": 54 }))
        );
        assert_eq!(
            overrides[0].new_value,
            Some(serde_json::json!({
                "percentage": 40,
                "justification": "Adjusted for field work delays",
            }))
        );
    }

    #[test]
    fn override_holds_until_the_next_chapter_trigger() {
        let (_temp, service) = service();
        let (advisor, student, thesis) = assigned_thesis(&service);
        fill_default_chapters(&service, &student, &thesis.id);

        service
            .override_percentage(&advisor, &thesis.id, 40, "External review pending")
            .expect("override");

        // The next chapter update re-derives the rollup from chapters.
        let chapters = service.store().list_chapters(&thesis.id).expect("chapters");
        service
            .update_chapter_percentage(&student, &chapters[4].id, 30)
            .expect("update chapter");

        let stored = service
            .store()
            .get_thesis(&thesis.id)
            .expect("get thesis")
            .expect("thesis exists");
        // Mean of [100, 80, 60, 30, 30].
        assert_eq!(stored.overall_percentage, 60);
    }

    #[test]
    fn override_without_chapters_skips_the_comment_but_not_the_activity() {
        let (_temp, service) = service();
        let (advisor, _student, thesis) = assigned_thesis(&service);

        let chapters = service.store().list_chapters(&thesis.id).expect("chapters");
        for chapter in &chapters {
            service
                .delete_chapter(&advisor, &chapter.id)
                .expect("delete chapter");
        }

        let updated = service
            .override_percentage(&advisor, &thesis.id, 25, "Archival review only")
            .expect("override");
        assert_eq!(updated.overall_percentage, 25);

        let activities = service
            .store()
            .list_activities(&thesis.id, Some(ActivityKind::PercentageUpdate), 10, 0)
            .expect("activities");
        assert_eq!(activities.len(), 1);
    }

    #[test]
    fn override_validates_input_and_ownership() {
        let (_temp, service) = service();
        let (advisor, _student, thesis) = assigned_thesis(&service);

        let blank = service.override_percentage(&advisor, &thesis.id, 40, "   ");
        assert!(matches!(blank, Err(ServiceError::Validation(_))));

        let out_of_range = service.override_percentage(&advisor, &thesis.id, 101, "why");
        assert!(matches!(out_of_range, Err(ServiceError::Validation(_))));

        let other_advisor = service
            .create_user(new_user("Other Advisor", "other@uni.edu", Role::Advisor))
            .expect("create advisor");
        let not_owner =
            service.override_percentage(&actor_for(&other_advisor), &thesis.id, 40, "why");
        assert!(matches!(not_owner, Err(ServiceError::Permission(_))));
    }

    #[test]
    fn recompute_overall_is_idempotent() {
        let (_temp, service) = service();
        let (_advisor, student, thesis) = assigned_thesis(&service);
        fill_default_chapters(&service, &student, &thesis.id);

        let first = service.recompute_overall(&thesis.id).expect("recompute");
        let second = service.recompute_overall(&thesis.id).expect("recompute");
        assert_eq!(first, 54);
        assert_eq!(second, 54);
    }
}
