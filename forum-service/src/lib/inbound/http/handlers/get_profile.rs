use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Principal;
use crate::domain::user::ports::ProfileServicePort;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::middleware::CurrentPrincipal;
use crate::inbound::http::router::AppState;

pub async fn get_profile<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    current: CurrentPrincipal,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    state
        .profile_service
        .get_profile(current.id())
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}

/// Public view of a principal; never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&Principal> for ProfileResponseData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.0,
            username: principal.username.as_str().to_string(),
            email: principal.email.as_str().to_string(),
        }
    }
}
