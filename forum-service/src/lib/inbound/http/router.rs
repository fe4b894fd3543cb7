use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_profile::get_profile;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::update_profile::update_profile;
use super::handlers::ApiError;
use super::middleware::authenticate;
use super::middleware::authorize;
use crate::domain::security::AuthorizationPolicy;
use crate::domain::security::RequestAuthenticator;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::AuthService;
use crate::domain::user::service::ProfileService;

pub struct AppState<UR>
where
    UR: UserRepository,
{
    pub auth_service: Arc<AuthService<UR>>,
    pub profile_service: Arc<ProfileService<UR>>,
    pub request_authenticator: Arc<RequestAuthenticator<UR>>,
    pub policy: Arc<AuthorizationPolicy>,
}

// Manual impl: a derive would require `UR: Clone`.
impl<UR> Clone for AppState<UR>
where
    UR: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            profile_service: Arc::clone(&self.profile_service),
            request_authenticator: Arc::clone(&self.request_authenticator),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<UR> AppState<UR>
where
    UR: UserRepository,
{
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        policy: AuthorizationPolicy,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(
                Arc::clone(&repository),
                Arc::clone(&authenticator),
            )),
            profile_service: Arc::new(ProfileService::new(
                Arc::clone(&repository),
                Arc::clone(&authenticator),
            )),
            request_authenticator: Arc::new(RequestAuthenticator::new(authenticator, repository)),
            policy: Arc::new(policy),
        }
    }
}

/// Build the HTTP application.
///
/// Every request, matched or not, passes `authenticate` then `authorize`
/// before reaching a handler or the 404 fallback.
pub fn create_router<UR: UserRepository>(
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    policy: AuthorizationPolicy,
) -> Router {
    let state = AppState::new(repository, authenticator, policy);

    let auth_routes = Router::new()
        .route("/auth/login", post(login::<UR>))
        .route("/auth/register", post(register::<UR>));

    let user_routes = Router::new().route(
        "/user/profile",
        get(get_profile::<UR>).put(update_profile::<UR>),
    );

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers are left out: they carry bearer tokens.
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .fallback(not_found)
        // Added last runs first: authenticate, then authorize.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::<UR>,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<UR>,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}
