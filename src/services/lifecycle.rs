use chrono::Utc;
use std::sync::Arc;

use crate::models::{parse_event_date, Attendance, NewEvent};
use crate::store::EventStore;
use crate::utils::error::AppError;

/// Raw descriptive fields of an event as submitted by the client.
#[derive(Debug, Clone)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
}

/// Creation and deletion of events. The creator becomes the single
/// organizer and is auto-enrolled into the attendee list; deletion is a
/// hard delete restricted to the organizer.
pub struct EventLifecycle {
    events: Arc<dyn EventStore>,
}

impl EventLifecycle {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    pub async fn create_event(&self, viewer: &str, fields: EventFields) -> Result<i64, AppError> {
        let title = require_field(&fields.title, "title")?;
        let description = require_field(&fields.description, "description")?;
        let date = parse_event_date(&fields.date, "date")?;
        let time = require_field(&fields.time, "time")?;
        let location = require_field(&fields.location, "location")?;

        let event_id = self
            .events
            .insert(NewEvent {
                title,
                description,
                date,
                time,
                location,
                organizer: viewer.to_string(),
                attendees: vec![Attendance::organizer(viewer)],
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(event_id, organizer = viewer, "Event created");
        Ok(event_id)
    }

    pub async fn delete_event(&self, viewer: &str, event_id: i64) -> Result<(), AppError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.organizer != viewer {
            tracing::warn!(
                event_id,
                viewer,
                organizer = %event.organizer,
                "Delete attempt by non-organizer"
            );
            return Err(AppError::Forbidden(
                "You cannot delete this event. Only the event creator can delete it.".to_string(),
            ));
        }

        if !self.events.delete(event_id).await? {
            return Err(AppError::InternalServerError(
                "Failed to delete event".to_string(),
            ));
        }

        tracing::info!(event_id, organizer = viewer, "Event deleted");
        Ok(())
    }
}

fn require_field(value: &str, name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "{} is required",
            name
        )));
    }
    Ok(trimmed.to_string())
}
