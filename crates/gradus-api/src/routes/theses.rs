use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use gradus_core::Thesis;
use gradus_service::{
    ActivityFeed, ActivityFeedRequest, ActivityReport, AssignThesisRequest, RosterEntry,
    ThesisDetail,
};

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
    pub percentage: u8,
    pub justification: String,
}

pub async fn roster(
    State(state): State<AppState>,
    Identity(actor): Identity,
) -> ApiResult<Json<Vec<RosterEntry>>> {
    let entries = state.service().advisor_roster(&actor)?;
    Ok(Json(entries))
}

pub async fn assign(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<AssignThesisRequest>,
) -> ApiResult<(StatusCode, Json<Thesis>)> {
    let thesis = state.service().assign_thesis(&actor, body)?;
    Ok((StatusCode::CREATED, Json(thesis)))
}

pub async fn mine(
    State(state): State<AppState>,
    Identity(actor): Identity,
) -> ApiResult<Json<ThesisDetail>> {
    let detail = state.service().my_thesis(&actor)?;
    Ok(Json(detail))
}

pub async fn detail(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(thesis_id): Path<String>,
) -> ApiResult<Json<ThesisDetail>> {
    let detail = state.service().thesis_detail(&actor, &thesis_id)?;
    Ok(Json(detail))
}

pub async fn override_percentage(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(thesis_id): Path<String>,
    Json(body): Json<OverrideBody>,
) -> ApiResult<Json<Thesis>> {
    let thesis = state.service().override_percentage(
        &actor,
        &thesis_id,
        body.percentage,
        &body.justification,
    )?;
    Ok(Json(thesis))
}

pub async fn activity(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(thesis_id): Path<String>,
    Query(query): Query<ActivityFeedRequest>,
) -> ApiResult<Json<ActivityFeed>> {
    let feed = state.service().activity_feed(&actor, &thesis_id, query)?;
    Ok(Json(feed))
}

pub async fn activity_report(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(thesis_id): Path<String>,
) -> ApiResult<Json<ActivityReport>> {
    let report = state.service().activity_report(&actor, &thesis_id)?;
    Ok(Json(report))
}
