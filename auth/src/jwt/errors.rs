use thiserror::Error;

/// Error type for token operations.
///
/// `TokenExpired` and `MalformedToken` are both "unauthorized" to a caller;
/// they are kept apart so logs can tell a stale token from a broken one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is malformed: {0}")]
    MalformedToken(String),
}
