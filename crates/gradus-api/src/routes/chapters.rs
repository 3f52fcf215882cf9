use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use gradus_core::Chapter;
use gradus_service::{ChapterCreateRequest, ChapterEditRequest};

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PercentageBody {
    pub percentage: u8,
}

pub async fn create(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<ChapterCreateRequest>,
) -> ApiResult<(StatusCode, Json<Chapter>)> {
    let chapter = state.service().create_chapter(&actor, body)?;
    Ok((StatusCode::CREATED, Json(chapter)))
}

pub async fn edit(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(chapter_id): Path<String>,
    Json(body): Json<ChapterEditRequest>,
) -> ApiResult<Json<Chapter>> {
    let chapter = state.service().edit_chapter(&actor, &chapter_id, body)?;
    Ok(Json(chapter))
}

pub async fn remove(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(chapter_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service().delete_chapter(&actor, &chapter_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn percentage(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(chapter_id): Path<String>,
    Json(body): Json<PercentageBody>,
) -> ApiResult<Json<Chapter>> {
    let chapter = state
        .service()
        .update_chapter_percentage(&actor, &chapter_id, body.percentage)?;
    Ok(Json(chapter))
}

pub async fn approve(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(chapter_id): Path<String>,
) -> ApiResult<Json<Chapter>> {
    let chapter = state.service().approve_chapter(&actor, &chapter_id)?;
    Ok(Json(chapter))
}
