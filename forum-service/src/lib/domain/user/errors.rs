use std::fmt;

use thiserror::Error;

use crate::domain::user::models::PrincipalId;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be blank")]
    Blank,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email must not be blank")]
    Blank,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password must contain a lowercase letter")]
    MissingLowercase,

    #[error("Password must contain an uppercase letter")]
    MissingUppercase,

    #[error("Password must contain a digit")]
    MissingDigit,

    #[error("Password must contain a special character")]
    MissingSpecialCharacter,
}

/// A uniqueness constraint violated by a registration or profile update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conflict {
    UsernameTaken,
    EmailTaken,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::UsernameTaken => f.write_str("Username is already taken"),
            Conflict::EmailTaken => f.write_str("Email is already taken"),
        }
    }
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(Conflict::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level error for all principal-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(PrincipalId),

    /// Unknown login or wrong password; the message does not say which.
    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("{}", join_conflicts(.0))]
    Conflict(Vec<Conflict>),

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_lists_every_violation() {
        let err = UserError::Conflict(vec![Conflict::UsernameTaken, Conflict::EmailTaken]);
        assert_eq!(
            err.to_string(),
            "Username is already taken, Email is already taken"
        );
    }

    #[test]
    fn test_authentication_failed_does_not_name_a_field() {
        let message = UserError::AuthenticationFailed.to_string();
        assert!(!message.to_lowercase().contains("password"));
        assert!(!message.to_lowercase().contains("username"));
    }
}
