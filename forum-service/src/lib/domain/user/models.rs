use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

/// A registered forum member, as seen by the security layer.
///
/// Username and email are each unique under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Principal unique identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrincipalId(pub i64);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Trimmed, non-blank, at most 255 characters. Stored with its original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 255;

    /// Create a new valid username from raw input.
    ///
    /// # Errors
    /// * `Blank` - Nothing left after trimming
    /// * `TooLong` - Longer than 255 characters
    pub fn new(username: impl AsRef<str>) -> Result<Self, UsernameError> {
        let username = username.as_ref().trim();
        let length = username.chars().count();

        if length == 0 {
            Err(UsernameError::Blank)
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(username.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Trimmed and validated with an RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Blank` - Nothing left after trimming
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(EmailError::Blank);
        }

        email_address::EmailAddress::from_str(email)
            .map(|_| EmailAddress(email.to_string()))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the password policy.
///
/// At least 8 characters with a lowercase letter, an uppercase letter, a digit
/// and a character that is neither letter nor digit. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters after trimming
    /// * `MissingLowercase`, `MissingUppercase`, `MissingDigit`,
    ///   `MissingSpecialCharacter` - A required character class is absent
    pub fn new(password: impl AsRef<str>) -> Result<Self, PasswordPolicyError> {
        let password = password.as_ref().trim();
        let length = password.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PasswordPolicyError::MissingSpecialCharacter);
        }

        Ok(Self(password.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// What the store persists through `save`.
///
/// `id: None` inserts a new principal; `Some(id)` overwrites an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub id: Option<PrincipalId>,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
}

impl PrincipalRecord {
    pub fn new(username: Username, email: EmailAddress, password_hash: String) -> Self {
        Self {
            id: None,
            username,
            email,
            password_hash,
        }
    }

    pub fn existing(principal: Principal) -> Self {
        Self {
            id: Some(principal.id),
            username: principal.username,
            email: principal.email,
            password_hash: principal.password_hash,
        }
    }
}

/// Credentials presented at login.
///
/// `login` may be a username or an email address; both fields are trimmed by
/// the service, not here.
#[derive(Clone)]
pub struct LoginCommand {
    pub login: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Command to register a new principal with validated fields
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    pub fn new(username: Username, email: EmailAddress, password: Password) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Command to update the current principal's profile.
///
/// Username and email are always replaced; the password only when present.
#[derive(Debug)]
pub struct UpdateProfileCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Option<Password>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_trimmed() {
        let username = Username::new("  alice ").unwrap();
        assert_eq!(username.as_str(), "alice");
    }

    #[test]
    fn test_username_rejects_blank() {
        assert_eq!(Username::new("   "), Err(UsernameError::Blank));
    }

    #[test]
    fn test_username_rejects_too_long() {
        let result = Username::new("a".repeat(256));
        assert!(matches!(
            result,
            Err(UsernameError::TooLong { max: 255, actual: 256 })
        ));
    }

    #[test]
    fn test_email_is_trimmed_and_validated() {
        assert_eq!(
            EmailAddress::new(" alice@example.com ").unwrap().as_str(),
            "alice@example.com"
        );
        assert!(matches!(
            EmailAddress::new("not-an-email"),
            Err(EmailError::InvalidFormat(_))
        ));
        assert_eq!(EmailAddress::new(""), Err(EmailError::Blank));
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("Passw0rd!").is_ok());
        assert_eq!(
            Password::new("Pa0!").unwrap_err(),
            PasswordPolicyError::TooShort { min: 8, actual: 4 }
        );
        assert_eq!(
            Password::new("PASSW0RD!").unwrap_err(),
            PasswordPolicyError::MissingLowercase
        );
        assert_eq!(
            Password::new("passw0rd!").unwrap_err(),
            PasswordPolicyError::MissingUppercase
        );
        assert_eq!(
            Password::new("Password!").unwrap_err(),
            PasswordPolicyError::MissingDigit
        );
        assert_eq!(
            Password::new("Passw0rd").unwrap_err(),
            PasswordPolicyError::MissingSpecialCharacter
        );
    }

    #[test]
    fn test_password_is_never_printed() {
        let password = Password::new("Passw0rd!").unwrap();
        assert_eq!(format!("{:?}", password), "Password(***)");

        let command = LoginCommand::new("alice", "Passw0rd!");
        assert!(!format!("{:?}", command).contains("Passw0rd!"));
    }
}
