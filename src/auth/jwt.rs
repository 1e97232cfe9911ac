/// Token codec
///
/// Stateless signing and verification of access and refresh tokens. The two
/// token families use distinct secrets; nothing here touches the session
/// store. Verification failure is a single undifferentiated error: the
/// caller must not learn whether a token was malformed, forged, or merely
/// expired.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::Role;

/// Sign a short-lived access token embedding id, email, and role.
pub fn sign_access(
    account_id: Uuid,
    email: &str,
    role: Role,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = AccessClaims::new(
        account_id,
        email.to_string(),
        role,
        config.access_token_expiry,
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Sign a long-lived refresh token embedding only the account id.
pub fn sign_refresh(account_id: Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(account_id, config.refresh_token_expiry);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify an access token and recover its claims.
pub fn verify_access(token: &str, config: &JwtSettings) -> Result<AccessClaims, AppError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Access token validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}

/// Verify a refresh token and recover its claims.
///
/// A passing signature says nothing about authorization: the caller must
/// still find the token in the owning account's session list.
pub fn verify_refresh(token: &str, config: &JwtSettings) -> Result<RefreshClaims, AppError> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Refresh token validation failed: {}", e);
        AppError::Unauthorized("Invalid refresh token".to_string())
    })
}
