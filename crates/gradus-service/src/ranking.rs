use gradus_core::Role;
use gradus_progress::{RankingFilter, build_entries, distinct_programs_and_cohorts, statistics};
use gradus_store::Store;

use crate::{RankingView, ServiceError, ThesisService};

impl<S: Store> ThesisService<S> {
    // No actor here; the ranking is the one read anybody may perform.
    // Statistics describe the filtered slice, so the numbers always match
    // the visible list.
    pub fn public_ranking(&self, filter: RankingFilter) -> Result<RankingView, ServiceError> {
        let rows = self.store().list_public_theses()?;
        let entries = build_entries(&rows, &filter);
        let stats = statistics(&entries);

        let students = self.store().list_users_by_role(Role::Student)?;
        let (programs, cohorts) = distinct_programs_and_cohorts(&students);

        Ok(RankingView {
            entries,
            statistics: stats,
            programs,
            cohorts,
        })
    }
}
