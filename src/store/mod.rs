/// User and session store
///
/// Repository interface over account records and their live refresh-token
/// sessions. A session's token is only authoritative while it is present in
/// its owning account's session list; token verification alone is never
/// enough (see `auth::session`).
///
/// All session mutations are read-modify-write against a single account and
/// must be linearizable per account: two concurrent mutations of the same
/// account's session list must not lose either update.

mod memory;

pub use memory::InMemoryUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role carried into access-token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// A live refresh-token record owned by an account
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Account record. `password_hash` and `sessions` never leave the store
/// layer except through explicit session operations; serialize `PublicUser`
/// instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub sessions: Vec<Session>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an account. Email must already be normalized
/// and the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// Public projection of an account: no credential hash, no sessions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// Another account already owns this email
    DuplicateEmail,
    /// Referenced account does not exist
    NotFound,
    /// The backing store could not complete the operation
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateEmail => write!(f, "email already registered"),
            StoreError::NotFound => write!(f, "user not found"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Repository interface for accounts and their refresh-token sessions.
///
/// Implementations must make each session operation an atomic unit with
/// respect to the owning account. No cross-account atomicity is required.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Create an account. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Add a session record for the given token.
    async fn append_session(&self, account_id: Uuid, token: &str) -> Result<(), StoreError>;

    /// Look up a session by exact token value.
    async fn find_session(
        &self,
        account_id: Uuid,
        token: &str,
    ) -> Result<Option<Session>, StoreError>;

    /// Remove the session(s) matching the given token.
    async fn remove_session(&self, account_id: Uuid, token: &str) -> Result<(), StoreError>;

    /// Atomically swap the session matching `old_token` for a new record
    /// carrying `new_token`. Returns `false`, without mutating, when no
    /// session matches `old_token` — of two concurrent rotations presenting
    /// the same token, exactly one succeeds.
    async fn rotate_session(
        &self,
        account_id: Uuid,
        old_token: &str,
        new_token: &str,
    ) -> Result<bool, StoreError>;

    /// Remove every session for the account. Reuse-detection remediation.
    async fn clear_sessions(&self, account_id: Uuid) -> Result<(), StoreError>;

    /// Replace the account's whole session list with a single new record.
    async fn replace_sessions(&self, account_id: Uuid, token: &str) -> Result<(), StoreError>;
}
