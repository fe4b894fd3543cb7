use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::get_profile::ProfileResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::Username;
use crate::domain::user::ports::ProfileServicePort;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::middleware::CurrentPrincipal;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

pub async fn update_profile<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    current: CurrentPrincipal,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    state
        .profile_service
        .update_profile(current.id(), body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}

/// HTTP request body for a profile update.
///
/// A missing or blank `password` keeps the current one.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileRequest {
    username: String,
    email: String,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseUpdateProfileRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, ParseUpdateProfileRequestError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        let password = match self.password {
            Some(password) if !password.trim().is_empty() => Some(Password::new(password)?),
            _ => None,
        };

        Ok(UpdateProfileCommand {
            username,
            email,
            password,
        })
    }
}

impl From<ParseUpdateProfileRequestError> for ApiError {
    fn from(err: ParseUpdateProfileRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
