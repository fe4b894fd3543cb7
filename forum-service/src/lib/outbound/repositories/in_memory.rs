use std::collections::BTreeMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::Principal;
use crate::domain::user::models::PrincipalId;
use crate::domain::user::models::PrincipalRecord;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::Conflict;
use crate::user::errors::UserError;

/// Process-local credential store.
///
/// Same contract as the Postgres repository, including case-insensitive
/// uniqueness, without a database. Used by the test suites and for local runs.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    principals: RwLock<BTreeMap<PrincipalId, Principal>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            principals: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Delete a principal, returning it if it was present.
    pub async fn remove(&self, id: PrincipalId) -> Option<Principal> {
        self.principals.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.principals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.principals.read().await.is_empty()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn conflicts_for(
    principals: &BTreeMap<PrincipalId, Principal>,
    record: &PrincipalRecord,
) -> Vec<Conflict> {
    let others = || {
        principals
            .values()
            .filter(move |p| Some(p.id) != record.id)
    };

    let mut conflicts = Vec::new();
    if others().any(|p| same(p.username.as_str(), record.username.as_str())) {
        conflicts.push(Conflict::UsernameTaken);
    }
    if others().any(|p| same(p.email.as_str(), record.email.as_str())) {
        conflicts.push(Conflict::EmailTaken);
    }
    conflicts
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, UserError> {
        let principals = self.principals.read().await;

        Ok(principals
            .values()
            .find(|p| same(p.username.as_str(), identifier) || same(p.email.as_str(), identifier))
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, UserError> {
        Ok(self.principals.read().await.get(&id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserError> {
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .any(|p| same(p.username.as_str(), username)))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        let principals = self.principals.read().await;
        Ok(principals.values().any(|p| same(p.email.as_str(), email)))
    }

    async fn exists_by_username_excluding(
        &self,
        username: &str,
        id: PrincipalId,
    ) -> Result<bool, UserError> {
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .any(|p| p.id != id && same(p.username.as_str(), username)))
    }

    async fn exists_by_email_excluding(
        &self,
        email: &str,
        id: PrincipalId,
    ) -> Result<bool, UserError> {
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .any(|p| p.id != id && same(p.email.as_str(), email)))
    }

    async fn save(&self, record: PrincipalRecord) -> Result<Principal, UserError> {
        let mut principals = self.principals.write().await;

        let conflicts = conflicts_for(&principals, &record);
        if !conflicts.is_empty() {
            return Err(UserError::Conflict(conflicts));
        }

        let principal = match record.id {
            None => {
                let id = PrincipalId(self.next_id.fetch_add(1, Ordering::SeqCst));
                Principal {
                    id,
                    username: record.username,
                    email: record.email,
                    password_hash: record.password_hash,
                    created_at: Utc::now(),
                    updated_at: None,
                }
            }
            Some(id) => {
                let existing = principals.get(&id).ok_or(UserError::NotFound(id))?;
                Principal {
                    id,
                    username: record.username,
                    email: record.email,
                    password_hash: record.password_hash,
                    created_at: existing.created_at,
                    updated_at: Some(Utc::now()),
                }
            }
        };

        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }
}
