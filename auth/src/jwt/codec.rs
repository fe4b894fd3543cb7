use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Issues and checks signed access tokens.
///
/// Tokens are compact JWTs signed with HS256 under one process-wide secret.
/// Validity is a pure function of token content, the secret and the clock:
/// nothing is stored server-side.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Minimum secret length in bytes (256 bits) for HS256.
    pub const MIN_SECRET_LEN: usize = 32;

    /// Create a codec using the system clock.
    ///
    /// # Arguments
    /// * `secret` - Shared signing secret, at least `MIN_SECRET_LEN` bytes
    /// * `ttl` - Lifetime given to every issued token
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Create a codec reading time from `clock`.
    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let algorithm = Algorithm::HS256;

        // Expiry is checked against our own clock, not the library's.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject_id`, valid from now until now + TTL.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed, or the expiry is out of range
    pub fn issue(&self, subject_id: i64) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject_id, self.clock.now(), self.ttl)?;
        self.encode(&claims)
    }

    /// Sign an arbitrary payload with the codec's key.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Whether `token` carries a valid signature and has not yet expired.
    ///
    /// Never fails: every decoding, signature or format problem yields `false`.
    pub fn verify(&self, token: &str) -> bool {
        match self.decode_claims(token) {
            Ok(claims) => !claims.is_expired(self.clock.now().timestamp()),
            Err(_) => false,
        }
    }

    /// Extract the principal id from a token.
    ///
    /// Meant to follow a successful [`verify`](Self::verify), but performs
    /// every check again on its own.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature is valid but the token is past its expiry
    /// * `MalformedToken` - Any other decoding, signature or subject failure
    pub fn decode_subject_id(&self, token: &str) -> Result<i64, JwtError> {
        let claims = self.decode_claims(token)?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        claims.subject_id()
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::MalformedToken(e.to_string()))
    }
}
