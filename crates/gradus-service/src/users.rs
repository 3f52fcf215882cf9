use serde::Deserialize;

use gradus_core::{Role, User, new_id, now_millis};
use gradus_store::Store;

use crate::{ServiceError, ThesisService};

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub program: String,
    pub cohort: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub hidden_from_ranking: bool,
}

impl<S: Store> ThesisService<S> {
    // Identity material (passwords, sessions) lives outside this service;
    // users here are profile rows the fronting auth layer refers to by id.
    pub fn create_user(&self, request: NewUserRequest) -> Result<User, ServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name must not be empty".to_owned()));
        }

        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::Validation(format!(
                "invalid email address: {}",
                request.email
            )));
        }

        if self.store().get_user_by_email(&email)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "a user with email {email} already exists"
            )));
        }

        let user = User {
            id: new_id(),
            name: name.to_owned(),
            email,
            role: request.role,
            program: request.program.trim().to_owned(),
            cohort: request.cohort.trim().to_owned(),
            avatar: request.avatar.filter(|a| !a.trim().is_empty()),
            hidden_from_ranking: request.hidden_from_ranking,
            created_at: now_millis(),
        };
        self.store().insert_user(&user)?;

        Ok(user)
    }
}
