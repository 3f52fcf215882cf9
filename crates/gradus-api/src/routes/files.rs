use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

// Placeholder kept so clients get a stable answer instead of a 404 while
// document uploads remain unimplemented.
pub async fn upload() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "error": "file uploads are not implemented" })),
    )
}
