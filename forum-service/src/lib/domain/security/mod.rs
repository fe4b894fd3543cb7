pub mod context;
pub mod policy;
pub mod request_authenticator;

pub use context::AuthenticationContext;
pub use policy::AccessDecision;
pub use policy::AuthorizationPolicy;
pub use request_authenticator::AuthenticationOutcome;
pub use request_authenticator::AuthenticationRejection;
pub use request_authenticator::RequestAuthenticator;
