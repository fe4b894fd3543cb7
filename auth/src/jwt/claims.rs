use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Payload carried by an access token.
///
/// Timestamps are RFC 7519 NumericDate values (seconds since the Unix epoch).
/// `iat` is rounded down and `exp` rounded up to whole seconds, so the token is
/// never valid for less than the configured TTL. Both are fixed at issuance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the principal id, as a decimal string.
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a principal, issued at `issued_at` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `subject_id` - Principal identifier
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// Claims with sub, iat and exp set
    ///
    /// # Errors
    /// * `EncodingFailed` - `issued_at + ttl` is outside the representable range
    pub fn for_subject(
        subject_id: i64,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("token lifetime out of range: {}", ttl))
        })?;

        let mut exp = expires_at.timestamp();
        if expires_at.timestamp_subsec_nanos() > 0 {
            exp += 1;
        }

        Ok(Self {
            sub: subject_id.to_string(),
            iat: issued_at.timestamp(),
            exp,
        })
    }

    /// Parse the subject back into a principal id.
    ///
    /// # Errors
    /// * `MalformedToken` - Subject is not a decimal integer
    pub fn subject_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse::<i64>()
            .map_err(|e| JwtError::MalformedToken(format!("invalid subject: {}", e)))
    }

    /// A token stays valid while `now < exp`; at `exp` it is already expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
