/// Refresh-token session state machine
///
/// The rules for when a refresh token is honored. A presented token passes
/// through up to three gates: signature/expiry (codec), account resolution,
/// and membership in the account's live session list. A token that clears
/// the first two gates but is missing from the session list was already
/// consumed or revoked; that is treated as a compromise signal and every
/// session for the account is dropped.

use crate::auth::jwt::{sign_access, sign_refresh, verify_refresh};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::{User, UserStore};

/// Freshly minted token pair returned by issue and refresh operations
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// How a newly issued refresh token enters the session list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuePolicy {
    /// Add alongside existing sessions (registration)
    Append,
    /// Drop all prior sessions; a fresh login supersedes them
    ReplaceAll,
}

/// Mint an access/refresh token pair for the account and record the refresh
/// token as a live session.
pub async fn issue_tokens(
    user: &User,
    store: &dyn UserStore,
    config: &JwtSettings,
    policy: IssuePolicy,
) -> Result<TokenPair, AppError> {
    let access_token = sign_access(user.id, &user.email, user.role, config)?;
    let refresh_token = sign_refresh(user.id, config)?;

    match policy {
        IssuePolicy::Append => store.append_session(user.id, &refresh_token).await?,
        IssuePolicy::ReplaceAll => store.replace_sessions(user.id, &refresh_token).await?,
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchange a live refresh token for a new access token.
///
/// With `rotate_refresh` off the presented token stays in the session list
/// and is returned unchanged, so the operation is idempotent for a given
/// token until logout or expiry. With rotation on, the presented token is
/// removed and a fresh one issued in its place.
pub async fn refresh_tokens(
    presented: &str,
    store: &dyn UserStore,
    config: &JwtSettings,
) -> Result<TokenPair, AppError> {
    let claims = verify_refresh(presented, config)?;
    let account_id = claims.account_id()?;

    let user = store
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let refresh_token = if config.rotate_refresh {
        // Consume-and-replace in one store call: of two concurrent
        // refreshes presenting the same token, exactly one rotates and the
        // other falls through to reuse detection.
        let rotated = sign_refresh(account_id, config)?;
        store
            .rotate_session(account_id, presented, &rotated)
            .await?
            .then_some(rotated)
    } else {
        store
            .find_session(account_id, presented)
            .await?
            .map(|_| presented.to_string())
    };

    let refresh_token = match refresh_token {
        Some(token) => token,
        None => {
            // Structurally valid but absent from the live set: the token
            // was already consumed or revoked. Assume compromise and drop
            // every session for this account.
            store.clear_sessions(account_id).await?;
            tracing::warn!(
                account_id = %account_id,
                "Refresh token reuse detected; all sessions cleared"
            );
            return Err(AppError::Unauthorized(
                "Refresh token not recognized".to_string(),
            ));
        }
    };

    let access_token = sign_access(user.id, &user.email, user.role, config)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Remove the session backing the presented refresh token.
///
/// Best-effort: an invalid token or vanished account already means the
/// session is not live, so every failure is treated as "already logged out".
pub async fn revoke_token(presented: &str, store: &dyn UserStore, config: &JwtSettings) {
    let claims = match verify_refresh(presented, config) {
        Ok(claims) => claims,
        Err(_) => return,
    };

    let account_id = match claims.account_id() {
        Ok(id) => id,
        Err(_) => return,
    };

    if let Err(e) = store.remove_session(account_id, presented).await {
        tracing::debug!(account_id = %account_id, error = %e, "Logout: nothing to revoke");
    }
}
