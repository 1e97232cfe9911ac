/// In-memory user store
///
/// Default `UserStore` implementation backed by a `HashMap` keyed by account
/// id, with an email index for login lookups. A single `RwLock` guards both
/// maps, so every mutation is a full read-modify-write under the write lock
/// and session updates for one account cannot interleave.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, Session, StoreError, User, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn user_mut(&mut self, account_id: Uuid) -> Result<&mut User, StoreError> {
        self.users.get_mut(&account_id).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .email_index
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.email_index.contains_key(&new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash,
            name: new_user.name,
            role: new_user.role,
            sessions: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        inner.email_index.insert(new_user.email, user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn append_session(&self, account_id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(account_id)?;
        user.sessions.push(Session {
            token: token.to_string(),
            created_at: Utc::now(),
        });
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn find_session(
        &self,
        account_id: Uuid,
        token: &str,
    ) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.read().await;
        let user = inner.users.get(&account_id).ok_or(StoreError::NotFound)?;
        Ok(user.sessions.iter().find(|s| s.token == token).cloned())
    }

    async fn remove_session(&self, account_id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(account_id)?;
        user.sessions.retain(|s| s.token != token);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn rotate_session(
        &self,
        account_id: Uuid,
        old_token: &str,
        new_token: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(account_id)?;

        if !user.sessions.iter().any(|s| s.token == old_token) {
            return Ok(false);
        }

        user.sessions.retain(|s| s.token != old_token);
        user.sessions.push(Session {
            token: new_token.to_string(),
            created_at: Utc::now(),
        });
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn clear_sessions(&self, account_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(account_id)?;
        user.sessions.clear();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn replace_sessions(&self, account_id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(account_id)?;
        user.sessions = vec![Session {
            token: token.to_string(),
            created_at: Utc::now(),
        }];
        user.updated_at = Utc::now();
        Ok(())
    }
}
