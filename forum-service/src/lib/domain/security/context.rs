use std::collections::BTreeSet;

use crate::domain::user::models::Principal;

/// Identity established for a single request.
///
/// Created by the request authenticator, carried in the request's extensions
/// and dropped with the request. Never shared between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationContext {
    principal: Principal,
    authorities: BTreeSet<String>,
}

impl AuthenticationContext {
    /// Context for a principal holding no authorities.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            authorities: BTreeSet::new(),
        }
    }

    pub fn with_authorities<I, S>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorities
            .extend(authorities.into_iter().map(Into::into));
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}
