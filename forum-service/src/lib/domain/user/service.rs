use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::PrincipalId;
use crate::domain::user::models::PrincipalRecord;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::user::errors::Conflict;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::ProfileServicePort;
use crate::user::ports::UserRepository;

/// Argon2 is CPU-bound; run it on the blocking pool, not a runtime worker.
async fn hash_password(authenticator: &Arc<Authenticator>, password: &str) -> Result<String, UserError> {
    let authenticator = Arc::clone(authenticator);
    let password = password.to_string();

    tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
        .await
        .map_err(|e| UserError::HashingFailed(e.to_string()))?
        .map_err(|e| UserError::HashingFailed(e.to_string()))
}

/// Login and registration.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store
    /// * `authenticator` - Password verification and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<String, UserError> {
        let login = command.login.trim();
        let password = command.password.trim();

        let Some(principal) = self.repository.find_by_login_identifier(login).await? else {
            tracing::debug!("Login rejected: no principal matches the identifier");
            return Err(UserError::AuthenticationFailed);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let stored_hash = principal.password_hash.clone();
        let subject_id = principal.id.0;
        let outcome = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, subject_id)
        })
        .await
        .map_err(|e| UserError::HashingFailed(e.to_string()))?;

        match outcome {
            Ok(result) => {
                tracing::info!(user_id = %principal.id, "Login succeeded");
                Ok(result.access_token)
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::debug!(user_id = %principal.id, "Login rejected: password mismatch");
                Err(UserError::AuthenticationFailed)
            }
            Err(AuthenticationError::PasswordError(e)) => {
                tracing::error!(user_id = %principal.id, error = %e, "Stored password hash is unusable");
                Err(UserError::HashingFailed(e.to_string()))
            }
            Err(AuthenticationError::JwtError(e)) => Err(UserError::TokenIssuance(e.to_string())),
        }
    }

    async fn register(&self, command: RegisterCommand) -> Result<Principal, UserError> {
        // Check both constraints so the caller learns about every violation at once.
        let mut conflicts = Vec::new();
        if self
            .repository
            .exists_by_username(command.username.as_str())
            .await?
        {
            conflicts.push(Conflict::UsernameTaken);
        }
        if self.repository.exists_by_email(command.email.as_str()).await? {
            conflicts.push(Conflict::EmailTaken);
        }
        if !conflicts.is_empty() {
            return Err(UserError::Conflict(conflicts));
        }

        let password_hash = hash_password(&self.authenticator, command.password.as_str()).await?;

        let principal = self
            .repository
            .save(PrincipalRecord::new(
                command.username,
                command.email,
                password_hash,
            ))
            .await?;

        tracing::info!(user_id = %principal.id, "Principal registered");

        Ok(principal)
    }
}

/// Profile reads and updates for an authenticated principal.
pub struct ProfileService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> ProfileService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> ProfileServicePort for ProfileService<UR>
where
    UR: UserRepository,
{
    async fn get_profile(&self, id: PrincipalId) -> Result<Principal, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn update_profile(
        &self,
        id: PrincipalId,
        command: UpdateProfileCommand,
    ) -> Result<Principal, UserError> {
        let principal = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut conflicts = Vec::new();
        if self
            .repository
            .exists_by_username_excluding(command.username.as_str(), id)
            .await?
        {
            conflicts.push(Conflict::UsernameTaken);
        }
        if self
            .repository
            .exists_by_email_excluding(command.email.as_str(), id)
            .await?
        {
            conflicts.push(Conflict::EmailTaken);
        }
        if !conflicts.is_empty() {
            return Err(UserError::Conflict(conflicts));
        }

        let mut record = PrincipalRecord::existing(principal);
        record.username = command.username;
        record.email = command.email;

        if let Some(new_password) = command.password {
            record.password_hash = hash_password(&self.authenticator, new_password.as_str()).await?;
        }

        let updated = self.repository.save(record).await?;
        tracing::info!(user_id = %updated.id, "Profile updated");

        Ok(updated)
    }
}
