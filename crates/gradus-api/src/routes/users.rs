use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use gradus_core::User;
use gradus_service::NewUserRequest;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.service().create_user(body)?;
    Ok((StatusCode::CREATED, Json(user)))
}
