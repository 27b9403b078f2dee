use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;
use crate::AppState;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::InternalServerError("Failed to hash password".to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|_| {
        AppError::InternalServerError("Stored password hash is malformed".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// HS256 key pair derived from the configured secret. Tokens carry the
/// subject identity and an expiry; nothing else.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub fn issue_token(
    keys: &TokenKeys,
    email: &str,
    ttl_minutes: i64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|_| AppError::InternalServerError("Failed to issue token".to_string()))
}

/// Verifies signature and expiry and returns the subject identity.
pub fn verify_token(keys: &TokenKeys, token: &str) -> Result<String, AppError> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default()).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::AuthError("Token has expired".to_string()),
            _ => AppError::AuthError("Invalid token".to_string()),
        }
    })?;

    if data.claims.sub.is_empty() {
        return Err(AppError::AuthError("Invalid token payload".to_string()));
    }

    Ok(data.claims.sub)
}

/// The verified identity of the caller, asserted from the bearer token on
/// every authenticated route.
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::AuthError("Missing Authorization header".to_string()))?
            .to_str()
            .map_err(|_| AppError::AuthError("Invalid Authorization header".to_string()))?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::AuthError(
                "Invalid Authorization header format. Use 'Bearer <token>'".to_string(),
            )
        })?;

        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::AuthError("Token is required".to_string()));
        }

        let email = verify_token(&state.tokens, token)?;
        Ok(AuthUser(email))
    }
}
