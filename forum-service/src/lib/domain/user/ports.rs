use async_trait::async_trait;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::PrincipalId;
use crate::domain::user::models::PrincipalRecord;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::user::errors::UserError;

/// Port for login and registration.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Check credentials and issue an access token.
    ///
    /// # Arguments
    /// * `command` - Login identifier (username or email) and plaintext password
    ///
    /// # Returns
    /// Signed bearer token for the matching principal
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Unknown identifier or wrong password
    /// * `HashingFailed` - Stored hash could not be checked
    /// * `TokenIssuance` - Token could not be signed
    /// * `DatabaseError` - Store lookup failed
    async fn login(&self, command: LoginCommand) -> Result<String, UserError>;

    /// Register a new principal.
    ///
    /// # Returns
    /// The persisted principal
    ///
    /// # Errors
    /// * `Conflict` - Username and/or email already taken (all violations listed)
    /// * `HashingFailed` - Password hashing failed
    /// * `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Principal, UserError>;
}

/// Port for the current principal's own profile.
#[async_trait]
pub trait ProfileServicePort: Send + Sync + 'static {
    /// # Errors
    /// * `NotFound` - Principal does not exist
    /// * `DatabaseError` - Store lookup failed
    async fn get_profile(&self, id: PrincipalId) -> Result<Principal, UserError>;

    /// # Errors
    /// * `NotFound` - Principal does not exist
    /// * `Conflict` - New username and/or email belong to another principal
    /// * `HashingFailed` - Password hashing failed
    /// * `DatabaseError` - Store operation failed
    async fn update_profile(
        &self,
        id: PrincipalId,
        command: UpdateProfileCommand,
    ) -> Result<Principal, UserError>;
}

/// Credential store: persistence operations for principals.
///
/// Every username/email comparison is case-insensitive.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find the principal whose username OR email matches `identifier`.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, UserError>;

    /// Retrieve principal by identifier.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, UserError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError>;

    /// Whether a principal other than `id` uses `username`.
    async fn exists_by_username_excluding(
        &self,
        username: &str,
        id: PrincipalId,
    ) -> Result<bool, UserError>;

    /// Whether a principal other than `id` uses `email`.
    async fn exists_by_email_excluding(
        &self,
        email: &str,
        id: PrincipalId,
    ) -> Result<bool, UserError>;

    /// Insert (`record.id == None`) or overwrite (`Some(id)`) a principal.
    ///
    /// # Returns
    /// The stored principal, with its assigned id
    ///
    /// # Errors
    /// * `Conflict` - A uniqueness constraint was violated
    /// * `NotFound` - Overwrite of a principal that does not exist
    /// * `DatabaseError` - Database operation failed
    async fn save(&self, record: PrincipalRecord) -> Result<Principal, UserError>;
}
