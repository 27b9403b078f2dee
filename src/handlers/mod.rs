use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod auth;
pub mod events;
pub mod responses;
pub mod search;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventplanner-api",
    };

    success(payload, "Health check successful").into_response()
}

/// Event ids travel as decimal strings of a positive integer starting
/// at 1.
pub(crate) fn parse_event_id(raw: &str) -> Result<i64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "Event ID cannot be empty".to_string(),
        ));
    }

    match trimmed.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        Ok(_) => Err(AppError::ValidationError(
            "Event ID must be a positive integer starting from 1".to_string(),
        )),
        Err(_) => Err(AppError::ValidationError(
            "Invalid event ID format. Event ID must be an integer.".to_string(),
        )),
    }
}
