use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::handlers::parse_event_id;
use crate::services::EventFields;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct InviteRequest {
    pub event_id: String,
    pub email: String,
}

pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let event_id = state
        .lifecycle
        .create_event(
            &viewer,
            EventFields {
                title: payload.title,
                description: payload.description,
                date: payload.date,
                time: payload.time,
                location: payload.location,
            },
        )
        .await?;

    Ok(success(json!({ "event_id": event_id }), "Event created successfully").into_response())
}

pub async fn my_events(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
) -> Result<Response, AppError> {
    let events = state.membership.my_events(&viewer).await?;
    Ok(success(events, "Organized events retrieved").into_response())
}

pub async fn all_events_for_user(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
) -> Result<Response, AppError> {
    let events = state.membership.events_for_user(&viewer).await?;
    Ok(success(events, "Events retrieved").into_response())
}

pub async fn invited_events(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
) -> Result<Response, AppError> {
    let events = state.membership.invited_events(&viewer).await?;
    Ok(success(events, "Invited events retrieved").into_response())
}

pub async fn invite_user(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Json(payload): Json<InviteRequest>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&payload.event_id)?;

    let invitee = payload.email.trim();
    if invitee.is_empty() || !invitee.contains('@') {
        return Err(AppError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }

    state.membership.invite(&viewer, event_id, invitee).await?;
    Ok(empty_success("User invited successfully").into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&event_id)?;
    state.lifecycle.delete_event(&viewer, event_id).await?;
    Ok(empty_success("Event deleted successfully").into_response())
}
