/// JWT claims structures
///
/// Access tokens are self-contained: identity, email, and role travel in the
/// claims and validity is purely signature + expiry. Refresh token claims
/// carry only the account id plus a unique `jti`, so that two tokens issued
/// within the same second never share a string value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::Role;

/// Claims embedded in a short-lived access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (account id as UUID string)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(account_id: Uuid, email: String, role: Role, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: account_id.to_string(),
            email,
            role,
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    /// Extract the account id from the subject claim
    pub fn account_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

/// Claims embedded in a long-lived refresh token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Subject (account id as UUID string)
    pub sub: String,
    /// Unique token id; guarantees distinct token strings per issuance
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(account_id: Uuid, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: account_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    pub fn account_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))
    }
}
