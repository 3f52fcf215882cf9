use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::DateTime;
use serde::Deserialize;

use gradus_core::Milestone;
use gradus_service::{MilestoneCreateRequest, MilestoneEditRequest};

use crate::error::{ApiError, ApiResult};
use crate::identity::Identity;
use crate::state::AppState;

// Due dates arrive either as epoch millis or as an RFC 3339 string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DueDate {
    Millis(i64),
    Rfc3339(String),
}

impl DueDate {
    fn into_millis(self) -> Result<i64, ApiError> {
        match self {
            DueDate::Millis(millis) => Ok(millis),
            DueDate::Rfc3339(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|moment| moment.timestamp_millis())
                .map_err(|err| ApiError::BadRequest(format!("invalid due date {raw:?}: {err}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMilestoneBody {
    pub thesis_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_at: DueDate,
    #[serde(default)]
    pub chapter_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditMilestoneBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<DueDate>,
    #[serde(default)]
    pub chapter_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<CreateMilestoneBody>,
) -> ApiResult<(StatusCode, Json<Milestone>)> {
    let request = MilestoneCreateRequest {
        thesis_id: body.thesis_id,
        title: body.title,
        description: body.description,
        due_at: body.due_at.into_millis()?,
        chapter_id: body.chapter_id,
    };
    let milestone = state.service().create_milestone(&actor, request)?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

pub async fn edit(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(milestone_id): Path<String>,
    Json(body): Json<EditMilestoneBody>,
) -> ApiResult<Json<Milestone>> {
    let due_at = body.due_at.map(DueDate::into_millis).transpose()?;
    let request = MilestoneEditRequest {
        title: body.title,
        description: body.description,
        due_at,
        chapter_id: body.chapter_id,
    };
    let milestone = state
        .service()
        .edit_milestone(&actor, &milestone_id, request)?;
    Ok(Json(milestone))
}

pub async fn remove(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(milestone_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service().delete_milestone(&actor, &milestone_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(milestone_id): Path<String>,
) -> ApiResult<Json<Milestone>> {
    let milestone = state.service().toggle_milestone(&actor, &milestone_id)?;
    Ok(Json(milestone))
}
