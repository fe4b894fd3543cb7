use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use http::header::AUTHORIZATION;

use super::handlers::ApiError;
use crate::domain::security::AccessDecision;
use crate::domain::security::AuthenticationContext;
use crate::domain::security::AuthenticationOutcome;
use crate::domain::security::AuthenticationRejection;
use crate::domain::user::models::PrincipalId;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;

/// Resolves the bearer token, if any, and attaches an [`AuthenticationContext`]
/// to the request extensions.
///
/// Runs once per request. Requests without a usable identity pass through
/// untouched; only a token that verifies but cannot be decoded, or a failing
/// store, ends the request here.
pub async fn authenticate<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    mut req: Request,
    next: Next,
) -> Response {
    // Owned copies: the request body is not Sync, so no borrow of `req` may
    // live across the await below.
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let existing = req.extensions().get::<AuthenticationContext>().cloned();

    let outcome = state
        .request_authenticator
        .authenticate(authorization.as_deref(), existing.as_ref())
        .await;

    match outcome {
        Ok(AuthenticationOutcome::Authenticated(context)) => {
            req.extensions_mut().insert(context);
        }
        Ok(AuthenticationOutcome::Anonymous(reason)) => {
            tracing::debug!(?reason, path = %req.uri().path(), "Request continues anonymously");
        }
        Ok(AuthenticationOutcome::Retained) => {}
        Err(rejection) => return ApiError::from(rejection).into_response(),
    }

    next.run(req).await
}

/// Applies the authorization policy to the identity left by [`authenticate`].
pub async fn authorize<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    req: Request,
    next: Next,
) -> Response {
    let decision = state.policy.evaluate(
        req.uri().path(),
        req.extensions().get::<AuthenticationContext>(),
    );

    match decision {
        AccessDecision::Granted => next.run(req).await,
        AccessDecision::AuthenticationRequired => {
            ApiError::Unauthorized("Authentication required".to_string()).into_response()
        }
        AccessDecision::AccessDenied => {
            tracing::info!(path = %req.uri().path(), "Access denied by policy");
            ApiError::Forbidden("Access denied".to_string()).into_response()
        }
    }
}

impl From<AuthenticationRejection> for ApiError {
    fn from(rejection: AuthenticationRejection) -> Self {
        match rejection {
            AuthenticationRejection::Expired | AuthenticationRejection::Malformed(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthenticationRejection::StoreUnavailable(_) => {
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

/// Extractor for the current request's authenticated identity.
///
/// Rejects with 401 when the request carries no context, so handlers behind a
/// public rule can still use it safely.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub AuthenticationContext);

impl CurrentPrincipal {
    pub fn id(&self) -> PrincipalId {
        self.0.principal().id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticationContext>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}
