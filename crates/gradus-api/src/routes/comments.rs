use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use gradus_core::Comment;
use gradus_service::CommentCreateRequest;

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<CommentCreateRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.service().create_comment(&actor, body)?;
    Ok((StatusCode::CREATED, Json(comment)))
}
