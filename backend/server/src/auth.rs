//! # Auth
//!
//! Accounts, password hashing and bearer tokens.
//!
//! ## Tokens
//!
//! `v1.<payload>.<signature>`, both parts base64url without padding. The
//! payload is the JSON [`Claims`]; the signature is HMAC-SHA256 over the
//! encoded payload, keyed with `ERP_TOKEN_SECRET`.
//!
//! ## Passwords
//!
//! PHC strings (`$pbkdf2-sha256$i=..,l=32$<salt>$<hash>`) with a random
//! 16 byte salt.
use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use ledger::user::{Login, Profile, Registration, Role, User};
use pbkdf2::{
    Pbkdf2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, info};

use crate::{error::AppError, state::AppState, store::StoreError, utils::now};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: &str = "v1";
const SALT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token signing failed")]
    Signing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

fn mac(secret: &str) -> Result<HmacSha256, TokenError> {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::Signing)
}

pub fn issue_token(
    secret: &str,
    user: &User,
    issued_at: i64,
    ttl_secs: i64,
) -> Result<String, TokenError> {
    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        role: user.role,
        iat: issued_at,
        exp: issued_at + ttl_secs,
    };
    let claims = serde_json::to_vec(&claims).map_err(|_| TokenError::Signing)?;
    let payload = URL_SAFE_NO_PAD.encode(claims);

    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{TOKEN_VERSION}.{payload}.{signature}"))
}

pub fn verify_token(secret: &str, token: &str, now: i64) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(TOKEN_VERSION), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;
    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    let claims: Claims = URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or(TokenError::Malformed)?;

    if claims.exp <= now {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// PHC string with the crate's default PBKDF2-SHA256 parameters.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)?;

    Ok(Pbkdf2.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Parameters come from the stored string, so older hashes keep verifying.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .and_then(|hash| Pbkdf2.verify_password(password.as_bytes(), &hash))
        .is_ok()
}

/// Resolves the bearer token in `headers` to its claims.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    verify_token(&state.config.token_secret, token, Utc::now().timestamp())
        .map_err(|e| AppError::Unauthorized(e.to_string()))
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&state, request.headers())?;
    debug!("Authenticated {} for {}", claims.sub, request.uri());

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

fn respond(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let access_token = issue_token(
        &state.config.token_secret,
        user,
        Utc::now().timestamp(),
        state.config.token_ttl_secs,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
    })
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    registration.validate()?;

    let hash = hash_password(&registration.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?;
    let user = User::create(&registration, hash, now());
    let user = state
        .repo::<User>()
        .insert(user)
        .await
        .map_err(|e| match e {
            StoreError::Conflict { field, .. } => {
                AppError::BadRequest(format!("{} is already taken", capitalize(field)))
            }
            other => other.into(),
        })?;
    info!("Registered user {}", user.username);

    Ok((StatusCode::CREATED, Json(respond(&state, &user)?)))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(login): Json<Login>,
) -> Result<Json<AuthResponse>, AppError> {
    let users = state
        .repo::<User>()
        .filter(|user| user.answers_to(&login.username_or_email))
        .await?;

    let user = users
        .into_iter()
        .find(|user| verify_password(&login.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    Ok(Json(respond(&state, &user)?))
}

pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, AppError> {
    let claims = authenticate(&state, &headers)?;

    let user = state
        .repo::<User>()
        .find(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    Ok(Json(user.profile()))
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn user() -> User {
        let registration = Registration {
            username: "lan".to_string(),
            email: "lan@example.com".to_string(),
            password: "secret".to_string(),
        };
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        let mut user = User::create(&registration, "hash".to_string(), now);
        user.id = 4;
        user
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token("key", &user(), 1_000, 60).expect("token");
        let claims = verify_token("key", &token, 1_030).expect("valid token");

        assert!(token.starts_with("v1."));
        assert_eq!(claims.sub, "lan");
        assert_eq!(claims.user_id, 4);
        assert_eq!(claims.exp, 1_060);
    }

    #[test]
    fn test_token_rejections() {
        let token = issue_token("key", &user(), 1_000, 60).expect("token");

        assert_eq!(verify_token("other", &token, 1_030), Err(TokenError::BadSignature));
        assert_eq!(verify_token("key", &token, 1_060), Err(TokenError::Expired));
        assert_eq!(verify_token("key", "v1.abc", 0), Err(TokenError::Malformed));
        assert_eq!(
            verify_token("key", &token.replacen("v1", "v2", 1), 1_030),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_tampered_payload() {
        let token = issue_token("key", &user(), 1_000, 60).expect("token");
        let forged = URL_SAFE_NO_PAD
            .encode(br#"{"sub":"root","userId":1,"role":"ADMIN","iat":0,"exp":9999999999}"#);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged;

        assert_eq!(
            verify_token("key", &parts.join("."), 1_030),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_password_hash() {
        let stored = hash_password("secret").expect("hash");

        assert!(stored.starts_with("$pbkdf2-sha256$"));
        assert!(verify_password("secret", &stored));
        assert!(!verify_password("Secret", &stored));
        assert!(!verify_password("secret", "plain"));
        assert_ne!(stored, hash_password("secret").expect("hash"));
    }

    #[test]
    fn test_password_hash_uses_strong_rounds() {
        let stored = hash_password("secret").expect("hash");
        let parsed = PasswordHash::new(&stored).expect("phc string");
        let rounds = parsed
            .params
            .get_decimal("i")
            .expect("iteration count");

        assert!(rounds > 10_000);
        assert_eq!(parsed.salt.map(|salt| salt.as_str().len()), Some(22));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("username"), "Username");
        assert_eq!(capitalize(""), "");
    }
}
