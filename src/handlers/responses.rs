use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::handlers::parse_event_id;
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::AppState;

#[derive(Deserialize)]
pub struct RespondRequest {
    pub response: String,
}

pub async fn respond_to_event(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<RespondRequest>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&event_id)?;

    let receipt = state
        .responses
        .respond(&viewer, event_id, &payload.response)
        .await?;

    let message = format!("Response '{}' recorded successfully", receipt.response);
    Ok(success(receipt, message).into_response())
}

pub async fn event_attendees(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&event_id)?;
    let report = state.responses.attendees(&viewer, event_id).await?;
    Ok(success(report, "Attendees retrieved successfully").into_response())
}
