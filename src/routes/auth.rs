/// Authentication routes
///
/// Thin sequencing over the session state machine and the user store:
/// registration, login, token refresh, logout, and current-user lookup.
/// Every response uses the `{success, data?, message?, errors?}` envelope.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    hash_password, issue_tokens, refresh_tokens, revoke_token, verify_password, AccessClaims,
    IssuePolicy, TokenPair,
};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::{NewUser, PublicUser, UserStore};
use crate::validators::{validate_email, validate_name, validate_password, validate_role};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<()> {
    fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

/// Registration/login payload: the public account plus both tokens
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionData {
    user: PublicUser,
    access_token: String,
    refresh_token: String,
}

impl SessionData {
    fn new(user: PublicUser, tokens: TokenPair) -> Self {
        Self {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    access_token: String,
    refresh_token: String,
}

/// POST /api/v1/auth/register
///
/// # Errors
/// - 400: field-level validation errors
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let mut errors = Vec::new();

    let email = validate_email(&form.email).map_err(|e| errors.push(e)).ok();
    if let Err(e) = validate_password(&form.password) {
        errors.push(e);
    }
    let name = validate_name(form.name.as_deref())
        .map_err(|e| errors.push(e))
        .ok();
    let role = validate_role(form.role.as_deref())
        .map_err(|e| errors.push(e))
        .ok();

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    // all Some once errors is empty
    let (email, name, role) = (email.unwrap(), name.unwrap(), role.unwrap());

    if store.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&form.password)?;
    let user = store
        .create(NewUser {
            email,
            password_hash,
            name,
            role,
        })
        .await?;

    let tokens = issue_tokens(&user, store.as_ref(), &jwt_config, IssuePolicy::Append).await?;

    tracing::info!(account_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(Envelope::data(SessionData::new(
        PublicUser::from(&user),
        tokens,
    ))))
}

/// POST /api/v1/auth/login
///
/// Replaces all of the account's prior sessions: a fresh login supersedes
/// previously issued refresh tokens.
///
/// # Errors
/// - 400: malformed email
/// - 401: unknown email or wrong password, indistinguishable by design
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let email = validate_email(&form.email).map_err(|e| AppError::Validation(vec![e]))?;

    let user = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let tokens = issue_tokens(&user, store.as_ref(), &jwt_config, IssuePolicy::ReplaceAll).await?;

    tracing::info!(account_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(Envelope::data(SessionData::new(
        PublicUser::from(&user),
        tokens,
    ))))
}

/// POST /api/v1/auth/refresh
///
/// # Errors
/// - 401: invalid/expired refresh token, vanished account, or a
///   structurally valid token missing from the live session set
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let tokens = refresh_tokens(&form.refresh_token, store.as_ref(), &jwt_config).await?;

    Ok(HttpResponse::Ok().json(Envelope::data(RefreshData {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })))
}

/// POST /api/v1/auth/logout
///
/// Always succeeds: a token that cannot be verified or resolved is already
/// as logged-out as it can get.
pub async fn logout(
    form: web::Json<RefreshRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    revoke_token(&form.refresh_token, store.as_ref(), &jwt_config).await;

    Ok(HttpResponse::Ok().json(Envelope::message("Logged out")))
}

/// GET /api/v1/auth/me
///
/// Requires a valid access token (enforced by `JwtMiddleware`, which injects
/// the claims). Re-fetches the account so the response reflects current
/// state, not the claims snapshot.
///
/// # Errors
/// - 404: account vanished since the token was issued
pub async fn me(
    claims: web::ReqData<AccessClaims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let account_id = claims.account_id()?;

    let user = store
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(Envelope::data(PublicUser::from(&user))))
}
