use serde::Deserialize;

use gradus_core::{ActivityKind, Actor, now_millis};
use gradus_progress::{daily_counts, summarize};
use gradus_store::Store;

use crate::{ActivityFeed, ActivityReport, ServiceError, ThesisService, require_participant};

const DEFAULT_FEED_LIMIT: u32 = 50;
const MAX_FEED_LIMIT: u32 = 200;
const REPORT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFeedRequest {
    #[serde(default)]
    pub kind: Option<ActivityKind>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl<S: Store> ThesisService<S> {
    pub fn activity_feed(
        &self,
        actor: &Actor,
        thesis_id: &str,
        request: ActivityFeedRequest,
    ) -> Result<ActivityFeed, ServiceError> {
        let thesis = self.thesis_by_id(thesis_id)?;
        require_participant(actor, &thesis)?;

        let limit = request
            .limit
            .unwrap_or(DEFAULT_FEED_LIMIT)
            .clamp(1, MAX_FEED_LIMIT);
        let offset = request.offset.unwrap_or(0);
        let items = self
            .store()
            .list_activities(&thesis.id, request.kind, limit, offset)?;
        let total = self.store().count_activities(&thesis.id, request.kind)?;

        Ok(ActivityFeed {
            items,
            total,
            limit,
            offset,
        })
    }

    // The report always walks the whole log; pagination would skew the
    // averages.
    pub fn activity_report(
        &self,
        actor: &Actor,
        thesis_id: &str,
    ) -> Result<ActivityReport, ServiceError> {
        let thesis = self.thesis_by_id(thesis_id)?;
        require_participant(actor, &thesis)?;

        let activities = self.store().all_activities(&thesis.id)?;
        let now = now_millis();
        Ok(ActivityReport {
            summary: summarize(&activities, now),
            daily: daily_counts(&activities, REPORT_WINDOW_DAYS, now),
        })
    }
}

#[cfg(test)]
mod tests {
    use gradus_core::{ActivityKind, Role};
    use gradus_store::Store;

    use crate::fixtures::{actor_for, assigned_thesis, fill_default_chapters, new_user, service};
    use crate::{ActivityFeedRequest, ServiceError};

    #[test]
    fn feed_defaults_return_the_whole_log_newest_first() {
        let (_temp, service) = service();
        let (advisor, student, thesis) = assigned_thesis(&service);
        fill_default_chapters(&service, &student, &thesis.id);

        let feed = service
            .activity_feed(&advisor, &thesis.id, ActivityFeedRequest::default())
            .expect("feed");
        assert_eq!(feed.items.len(), 5);
        assert_eq!(feed.total, 5);
        assert_eq!(feed.limit, 50);
        assert_eq!(feed.offset, 0);
        for pair in feed.items.windows(2) {
            assert!(pair[0].recorded_at >= pair[1].recorded_at);
        }
    }

    #[test]
    fn feed_applies_kind_filter_and_paging() {
        let (_temp, service) = service();
        let (_advisor, student, thesis) = assigned_thesis(&service);
        fill_default_chapters(&service, &student, &thesis.id);
        let milestones = service
            .store()
            .list_milestones(&thesis.id)
            .expect("milestones");
        service
            .toggle_milestone(&student, &milestones[0].id)
            .expect("toggle");

        let filtered = service
            .activity_feed(
                &student,
                &thesis.id,
                ActivityFeedRequest {
                    kind: Some(ActivityKind::ChapterUpdate),
                    limit: Some(2),
                    offset: Some(2),
                },
            )
            .expect("feed");
        assert_eq!(filtered.items.len(), 2);
        assert_eq!(filtered.total, 5);
        assert!(
            filtered
                .items
                .iter()
                .all(|record| record.kind == ActivityKind::ChapterUpdate)
        );

        let zero_limit = service
            .activity_feed(
                &student,
                &thesis.id,
                ActivityFeedRequest {
                    kind: None,
                    limit: Some(0),
                    offset: None,
                },
            )
            .expect("feed");
        assert_eq!(zero_limit.limit, 1);
        assert_eq!(zero_limit.items.len(), 1);
        assert_eq!(zero_limit.total, 6);
    }

    #[test]
    fn report_aggregates_the_whole_log() {
        let (_temp, service) = service();
        let (advisor, student, thesis) = assigned_thesis(&service);
        fill_default_chapters(&service, &student, &thesis.id);
        let milestones = service
            .store()
            .list_milestones(&thesis.id)
            .expect("milestones");
        service
            .toggle_milestone(&student, &milestones[0].id)
            .expect("toggle");

        let report = service
            .activity_report(&advisor, &thesis.id)
            .expect("report");
        assert_eq!(report.summary.total, 6);
        assert_eq!(report.summary.last_30_days, 6);
        assert_eq!(report.summary.weekly_average, 1.4);
        assert_eq!(
            report.summary.most_frequent_kind,
            Some(ActivityKind::ChapterUpdate)
        );
        assert_eq!(report.daily.len(), 30);
        let today: u64 = report.daily.iter().map(|day| day.count).sum();
        assert_eq!(today, 6);
    }

    #[test]
    fn feed_and_report_are_reserved_to_participants() {
        let (_temp, service) = service();
        let (_advisor, _student, thesis) = assigned_thesis(&service);

        let outsider = service
            .create_user(new_user("Bystander", "bystander@uni.edu", Role::Student))
            .expect("create user");
        let actor = actor_for(&outsider);

        let feed = service.activity_feed(&actor, &thesis.id, ActivityFeedRequest::default());
        assert!(matches!(feed, Err(ServiceError::Permission(_))));

        let report = service.activity_report(&actor, &thesis.id);
        assert!(matches!(report, Err(ServiceError::Permission(_))));
    }

    #[test]
    fn unknown_thesis_is_a_not_found_error() {
        let (_temp, service) = service();
        let (advisor, _student, _thesis) = assigned_thesis(&service);

        let result = service.activity_feed(&advisor, "missing", ActivityFeedRequest::default());
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }
}
