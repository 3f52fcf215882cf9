use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use gradus_progress::RankingFilter;
use gradus_service::RankingView;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub cohort: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

// The one endpoint that takes no identity; visibility filtering happens in
// the store query.
pub async fn ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> ApiResult<Json<RankingView>> {
    let filter = RankingFilter {
        program: query.program,
        cohort: query.cohort,
        search: query.search,
    };
    let view = state.service().public_ranking(filter)?;
    Ok(Json(view))
}
