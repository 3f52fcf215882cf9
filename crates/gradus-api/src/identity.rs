use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gradus_core::{Actor, Role};

use crate::error::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

// The fronting auth layer asserts who is calling via these headers; the
// service still checks ownership against the store, so a forged role alone
// cannot touch somebody else's thesis.
pub struct Identity(pub Actor);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = required_header(parts, ACTOR_ID_HEADER)?;
        let role = required_header(parts, ACTOR_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(ApiError::Unauthorized)?;

        Ok(Identity(Actor { user_id, role }))
    }
}

fn required_header(parts: &Parts, name: &str) -> Result<String, ApiError> {
    let value = parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if value.is_empty() {
        return Err(ApiError::Unauthorized(format!("missing {name} header")));
    }
    Ok(value.to_owned())
}
