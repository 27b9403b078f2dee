use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{Attendance, AttendeeRole, Rsvp};
use crate::store::EventStore;
use crate::utils::error::AppError;

/// Attendance responses and the organizer's aggregate view.
///
/// Per (event, attendee) pair the state machine is
/// `NoResponse -> {Going, Maybe, Not Going}` with a full mesh among the
/// three response states; once a response exists it can only be replaced
/// by another response, never cleared.
pub struct ResponseTracker {
    events: Arc<dyn EventStore>,
}

/// What a successful response write reports back to the caller.
#[derive(Debug, Serialize)]
pub struct RsvpReceipt {
    pub event_id: i64,
    pub response: Rsvp,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResponseSummary {
    #[serde(rename = "Going")]
    pub going: usize,
    #[serde(rename = "Maybe")]
    pub maybe: usize,
    #[serde(rename = "Not Going")]
    pub not_going: usize,
    #[serde(rename = "No Response")]
    pub no_response: usize,
}

/// The organizer's attendee report. All counts cover attendee-role
/// entries only; the organizer is implicitly attending and excluded.
#[derive(Debug, Serialize)]
pub struct AttendeeReport {
    pub event_id: i64,
    pub event_title: String,
    pub attendees: Vec<Attendance>,
    pub total_attendees: usize,
    pub response_summary: ResponseSummary,
}

impl ResponseTracker {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Records the viewer's response, overwriting any previous one
    /// (last write wins). Persisted as a replace of the whole attendee
    /// sequence, mirroring the embedded-document model.
    pub async fn respond(
        &self,
        viewer: &str,
        event_id: i64,
        raw_value: &str,
    ) -> Result<RsvpReceipt, AppError> {
        let mut event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let value: Rsvp = raw_value.parse()?;

        let position = event.attendees.iter().position(|a| a.email == viewer);
        let index = match position {
            Some(index) if event.attendees[index].role == AttendeeRole::Organizer => {
                return Err(AppError::ValidationError(
                    "Organizers do not need to respond. They are automatically marked as attending."
                        .to_string(),
                ));
            }
            Some(index) => index,
            None => {
                tracing::warn!(event_id, viewer, "Response from non-member");
                return Err(AppError::Forbidden(
                    "You are not an attendee of this event. Please request an invitation first."
                        .to_string(),
                ));
            }
        };

        let updated_at = Utc::now();
        event.attendees[index].response = Some(value);
        event.attendees[index].response_updated_at = Some(updated_at);

        if !self
            .events
            .replace_attendees(event_id, &event.attendees)
            .await?
        {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        tracing::info!(event_id, viewer, response = %value, "Response recorded");
        Ok(RsvpReceipt {
            event_id,
            response: value,
            updated_at,
        })
    }

    /// The attendee list plus response summary, visible to the organizer
    /// only.
    pub async fn attendees(&self, viewer: &str, event_id: i64) -> Result<AttendeeReport, AppError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.organizer != viewer {
            tracing::warn!(event_id, viewer, "Attendee report requested by non-organizer");
            return Err(AppError::Forbidden(
                "Only the event organizer can view attendee responses".to_string(),
            ));
        }

        let mut summary = ResponseSummary::default();
        let mut total_attendees = 0;
        for attendance in &event.attendees {
            if attendance.role != AttendeeRole::Attendee {
                continue;
            }
            total_attendees += 1;
            match attendance.response {
                Some(Rsvp::Going) => summary.going += 1,
                Some(Rsvp::Maybe) => summary.maybe += 1,
                Some(Rsvp::NotGoing) => summary.not_going += 1,
                None => summary.no_response += 1,
            }
        }

        Ok(AttendeeReport {
            event_id,
            event_title: event.title,
            attendees: event.attendees,
            total_attendees,
            response_summary: summary,
        })
    }
}
