use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::models::User;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};
use crate::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginPayload {
    access_token: String,
    token_type: &'static str,
}

fn validate_credentials(payload: &Credentials) -> Result<String, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }
    if payload.password.is_empty() {
        return Err(AppError::ValidationError(
            "Password is required".to_string(),
        ));
    }
    Ok(email.to_string())
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Response, AppError> {
    let email = validate_credentials(&payload)?;

    // Argon2 is deliberately slow; keep it off the async workers.
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| AppError::InternalServerError("Password hashing failed".to_string()))??;

    let user = User {
        email: email.clone(),
        password_hash,
        created_at: Utc::now(),
    };

    if !state.users.insert(&user).await? {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    tracing::info!(email = %email, "User registered");
    Ok(empty_success("User registered successfully").into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Response, AppError> {
    let email = validate_credentials(&payload)?;

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

    let password = payload.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|_| {
            AppError::InternalServerError("Password verification failed".to_string())
        })??;
    if !verified {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let token = issue_token(&state.tokens, &user.email, state.token_ttl_minutes)?;

    tracing::info!(email = %email, "Login successful");
    Ok(success(
        LoginPayload {
            access_token: token,
            token_type: "bearer",
        },
        "Login successful",
    )
    .into_response())
}
