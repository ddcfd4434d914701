//! Console JWT authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::UserRole;

use crate::db;
use crate::db::activity::Actor;
use crate::security_log;
use crate::state::AppState;

/// JWT claims of a console session
#[derive(Debug, Serialize, Deserialize)]
pub struct ConsoleClaims {
    /// User uid
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated console user extracted from JWT
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleIdentity {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl ConsoleIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Activity-log actor for this user
    pub fn actor(&self) -> Actor<'_> {
        Actor {
            user_id: &self.user_id,
            username: &self.username,
        }
    }
}

pub const JWT_EXPIRY_HOURS: i64 = 12;

pub fn create_token(
    user_id: &str,
    username: &str,
    role: UserRole,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = ConsoleClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<ConsoleClaims, AppError> {
    jsonwebtoken::decode::<ConsoleClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
        _ => {
            tracing::debug!("JWT validation failed: {e}");
            AppError::invalid_token("Invalid token")
        }
    })
}

/// Middleware that verifies the bearer token and inserts [`ConsoleIdentity`]
pub async fn console_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let claims = decode_token(token, &state.jwt_secret)?;

    // Role and status come from the stored profile; the token only names the user
    let user = db::users::get(state.db.as_ref(), &claims.sub)
        .await?
        .ok_or_else(|| {
            security_log!(WARN, "session_without_profile", uid = %claims.sub);
            AppError::invalid_token("Session user no longer exists")
        })?;
    if !user.status.is_active() {
        security_log!(WARN, "session_disabled_account", uid = %user.id, username = %user.username);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    if !user.role.can_use_console() {
        return Err(AppError::permission_denied("Console access denied"));
    }

    request.extensions_mut().insert(ConsoleIdentity {
        user_id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Admin-only guard, layered after [`console_auth_middleware`]
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<ConsoleIdentity>()
        .ok_or_else(AppError::not_authenticated)?;
    if !identity.is_admin() {
        security_log!(
            WARN,
            "admin_required",
            user_id = %identity.user_id,
            username = %identity.username,
            role = identity.role.as_str(),
            path = %request.uri().path()
        );
        return Err(AppError::admin_required());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_roundtrip_keeps_role() {
        let token = create_token("uid-1", "maria", UserRole::Manager, SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.exp - claims.iat, (JWT_EXPIRY_HOURS * 3600) as usize);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("uid-1", "maria", UserRole::Admin, SECRET).unwrap();
        let err = decode_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token() {
        let claims = ConsoleClaims {
            sub: "uid-1".into(),
            username: "maria".into(),
            role: UserRole::Admin,
            exp: 1_000,
            iat: 0,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            decode_token(&token, SECRET).unwrap_err().code,
            ErrorCode::TokenExpired
        );
    }
}
