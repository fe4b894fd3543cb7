//! Stateless authentication primitives
//!
//! - Password hashing (Argon2id)
//! - Signed access tokens (HS256 JWT) carrying a numeric subject, issue and expiry times
//! - Authentication coordination
//!
//! Services define their own ports and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(2));
//! let token = codec.issue(42).unwrap();
//! assert!(codec.verify(&token));
//! assert_eq!(codec.decode_subject_id(&token).unwrap(), 42);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, TokenCodec};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(2)),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.authenticate("password123", &hash, 7).unwrap();
//!
//! // Later requests: check the token, then read the subject
//! assert!(auth.verify_token(&result.access_token));
//! assert_eq!(auth.decode_subject_id(&result.access_token).unwrap(), 7);
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
