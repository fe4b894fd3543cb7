use std::ops::ControlFlow;
use std::sync::Arc;

use auth::Authenticator;
use auth::JwtError;
use thiserror::Error;

use super::context::AuthenticationContext;
use crate::domain::user::models::PrincipalId;
use crate::user::ports::UserRepository;

/// Scheme prefix of the `Authorization` header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a request carries on without an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousReason {
    /// No `Authorization: Bearer ...` header.
    NoBearerHeader,
    /// Bad signature, expired, or not a token at all.
    InvalidToken,
    /// Token is fine but its principal no longer exists.
    UnknownPrincipal,
}

/// Result of running the pipeline on one request.
///
/// Every variant lets the request proceed; the policy layer decides whether
/// the identity (or its absence) is good enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Anonymous(AnonymousReason),
    /// A context was already attached and has been left untouched.
    Retained,
    Authenticated(AuthenticationContext),
}

/// Hard failures that stop the request before it reaches the policy layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthenticationRejection {
    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<JwtError> for AuthenticationRejection {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthenticationRejection::Expired,
            other => AuthenticationRejection::Malformed(other.to_string()),
        }
    }
}

/// Resolves the bearer token of a request into an [`AuthenticationContext`].
///
/// Stages, in order:
/// 1. header: no bearer header → anonymous
/// 2. token: `verify` fails → anonymous (soft fail)
/// 3. existing context: already authenticated → retained
/// 4. principal: decode failure → rejection (hard fail); unknown id →
///    anonymous; otherwise authenticated
///
/// A token that fails `verify` is treated like no token at all, while a token
/// that passes `verify` and then fails to decode means the codec contradicts
/// itself, so the request is rejected outright.
pub struct RequestAuthenticator<UR>
where
    UR: UserRepository,
{
    authenticator: Arc<Authenticator>,
    repository: Arc<UR>,
}

impl<UR> RequestAuthenticator<UR>
where
    UR: UserRepository,
{
    pub fn new(authenticator: Arc<Authenticator>, repository: Arc<UR>) -> Self {
        Self {
            authenticator,
            repository,
        }
    }

    /// Run the pipeline once for a request.
    ///
    /// # Arguments
    /// * `authorization` - Raw `Authorization` header value, if any
    /// * `existing` - Context already attached to the request, if any
    ///
    /// # Errors
    /// * `Expired` / `Malformed` - A verified token failed to decode
    /// * `StoreUnavailable` - Principal lookup failed
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        existing: Option<&AuthenticationContext>,
    ) -> Result<AuthenticationOutcome, AuthenticationRejection> {
        let token = match bearer_token(authorization) {
            ControlFlow::Continue(token) => token,
            ControlFlow::Break(outcome) => return Ok(outcome),
        };

        if let ControlFlow::Break(outcome) = self.check_token(token) {
            return Ok(outcome);
        }

        if let ControlFlow::Break(outcome) = check_existing(existing) {
            return Ok(outcome);
        }

        self.resolve_principal(token).await
    }

    fn check_token(&self, token: &str) -> ControlFlow<AuthenticationOutcome> {
        if self.authenticator.verify_token(token) {
            ControlFlow::Continue(())
        } else {
            tracing::debug!("Bearer token failed verification; continuing unauthenticated");
            ControlFlow::Break(AuthenticationOutcome::Anonymous(
                AnonymousReason::InvalidToken,
            ))
        }
    }

    async fn resolve_principal(
        &self,
        token: &str,
    ) -> Result<AuthenticationOutcome, AuthenticationRejection> {
        let subject_id = self.authenticator.decode_subject_id(token).map_err(|e| {
            tracing::warn!(error = %e, "Verified token could not be decoded");
            AuthenticationRejection::from(e)
        })?;
        let id = PrincipalId(subject_id);

        let principal = self.repository.find_by_id(id).await.map_err(|e| {
            tracing::error!(user_id = %id, error = %e, "Principal lookup failed");
            AuthenticationRejection::StoreUnavailable(e.to_string())
        })?;

        match principal {
            Some(principal) => {
                tracing::debug!(user_id = %id, "Request authenticated");
                Ok(AuthenticationOutcome::Authenticated(
                    AuthenticationContext::new(principal),
                ))
            }
            None => {
                tracing::debug!(user_id = %id, "Token subject no longer exists");
                Ok(AuthenticationOutcome::Anonymous(
                    AnonymousReason::UnknownPrincipal,
                ))
            }
        }
    }
}

fn bearer_token(authorization: Option<&str>) -> ControlFlow<AuthenticationOutcome, &str> {
    match authorization.and_then(|value| value.strip_prefix(BEARER_PREFIX)) {
        Some(token) => ControlFlow::Continue(token),
        None => ControlFlow::Break(AuthenticationOutcome::Anonymous(
            AnonymousReason::NoBearerHeader,
        )),
    }
}

fn check_existing(existing: Option<&AuthenticationContext>) -> ControlFlow<AuthenticationOutcome> {
    match existing {
        Some(_) => ControlFlow::Break(AuthenticationOutcome::Retained),
        None => ControlFlow::Continue(()),
    }
}
