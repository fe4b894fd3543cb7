use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod get_profile;
pub mod login;
pub mod register;
pub mod update_profile;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    /// Every violated uniqueness constraint, in check order.
    Conflict(Vec<String>),
    /// No identity, or an unusable one (401).
    Unauthorized(String),
    /// Bad credentials at login, or identity not allowed (403).
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg, Vec::new())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, Vec::new()),
            ApiError::Conflict(errors) => (StatusCode::CONFLICT, errors.join(", "), errors),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, Vec::new()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, Vec::new()),
        };

        (
            status,
            Json(ApiResponseBody::new_error(status, message, errors)),
        )
            .into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_) => ApiError::BadRequest(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::AuthenticationFailed => ApiError::Forbidden(err.to_string()),
            UserError::Conflict(conflicts) => {
                ApiError::Conflict(conflicts.iter().map(ToString::to_string).collect())
            }
            UserError::HashingFailed(_)
            | UserError::TokenIssuance(_)
            | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed with an internal error");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String, errors: Vec<String>) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message, errors },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::models::PrincipalId;
    use crate::user::errors::Conflict;
    use crate::user::errors::PasswordPolicyError;

    #[test]
    fn test_user_error_status_mapping() {
        assert!(matches!(
            ApiError::from(UserError::AuthenticationFailed),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::NotFound(PrincipalId(1))),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::InvalidPassword(PasswordPolicyError::MissingDigit)),
            ApiError::BadRequest(_)
        ));
        assert_eq!(
            ApiError::from(UserError::Conflict(vec![
                Conflict::UsernameTaken,
                Conflict::EmailTaken
            ])),
            ApiError::Conflict(vec![
                "Username is already taken".to_string(),
                "Email is already taken".to_string(),
            ])
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = ApiError::from(UserError::DatabaseError(
            "connection refused to 10.0.0.3".to_string(),
        ));
        assert_eq!(
            err,
            ApiError::InternalServerError("Internal server error".to_string())
        );
    }

    #[test]
    fn test_error_body_omits_empty_errors() {
        let body = ApiResponseBody::new_error(
            StatusCode::FORBIDDEN,
            "Invalid credentials".to_string(),
            Vec::new(),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status_code": 403,
                "data": { "message": "Invalid credentials" }
            })
        );
    }
}
