use gradus_core::{Actor, now_millis};
use gradus_progress::{classify, summarize};
use gradus_store::Store;

use crate::{RosterEntry, ServiceError, ThesisService, require_advisor};

impl<S: Store> ThesisService<S> {
    // One entry per supervised thesis, each carrying the alert level and the
    // supporting numbers the advisor triages by.
    pub fn advisor_roster(&self, actor: &Actor) -> Result<Vec<RosterEntry>, ServiceError> {
        require_advisor(actor)?;

        let now = now_millis();
        let theses = self.store().list_theses_for_advisor(&actor.user_id)?;
        let mut entries = Vec::with_capacity(theses.len());
        for thesis in theses {
            let student = self.user_by_id(&thesis.student_id)?;
            let activities = self.store().all_activities(&thesis.id)?;
            let milestones = self.store().list_milestones(&thesis.id)?;

            let alert = classify(
                thesis.overall_percentage,
                &activities,
                &milestones,
                &self.alerts,
                now,
            );
            let summary = summarize(&activities, now);
            let next_milestone = milestones
                .iter()
                .find(|milestone| !milestone.completed)
                .cloned();

            entries.push(RosterEntry {
                thesis,
                student,
                alert,
                last_activity_at: summary.last_activity_at,
                activity_last_30_days: summary.last_30_days,
                next_milestone,
            });
        }
        Ok(entries)
    }
}
