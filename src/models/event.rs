use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::AppError;

/// Role of a member inside one event's attendee list. Assigned once at
/// insertion and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeRole {
    Organizer,
    Attendee,
}

/// An attendee's stated intent. The wire literals are exactly "Going",
/// "Maybe" and "Not Going"; anything else is rejected as a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rsvp {
    Going,
    Maybe,
    #[serde(rename = "Not Going")]
    NotGoing,
}

impl Rsvp {
    pub const VALID_VALUES: &'static str = "Going, Maybe, Not Going";
}

impl FromStr for Rsvp {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Going" => Ok(Rsvp::Going),
            "Maybe" => Ok(Rsvp::Maybe),
            "Not Going" => Ok(Rsvp::NotGoing),
            _ => Err(AppError::ValidationError(format!(
                "Invalid response. Must be one of: {}",
                Rsvp::VALID_VALUES
            ))),
        }
    }
}

impl fmt::Display for Rsvp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rsvp::Going => "Going",
            Rsvp::Maybe => "Maybe",
            Rsvp::NotGoing => "Not Going",
        };
        f.write_str(label)
    }
}

/// One membership record inside an event. The organizer is inserted at
/// creation and never holds a response; attendee entries may overwrite
/// their response any number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub email: String,
    pub role: AttendeeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Rsvp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_updated_at: Option<DateTime<Utc>>,
}

impl Attendance {
    pub fn organizer(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: AttendeeRole::Organizer,
            response: None,
            response_updated_at: None,
        }
    }

    pub fn attendee(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: AttendeeRole::Attendee,
            response: None,
            response_updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub organizer: String,
    pub attendees: Vec<Attendance>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn attendance_of(&self, email: &str) -> Option<&Attendance> {
        self.attendees.iter().find(|a| a.email == email)
    }

    pub fn is_member(&self, email: &str) -> bool {
        self.attendance_of(email).is_some()
    }
}

/// Descriptive fields of a new event; the store allocates the id and the
/// caller becomes the organizer.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub organizer: String,
    pub attendees: Vec<Attendance>,
    pub created_at: DateTime<Utc>,
}

/// An event as seen by one viewer: the stored record plus the viewer's
/// role and own response. Built from an owned `Event`, so the stored
/// record is never mutated in place.
#[derive(Debug, Serialize)]
pub struct EventView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub organizer: String,
    pub attendees: Vec<Attendance>,
    pub created_at: DateTime<Utc>,
    pub user_role: AttendeeRole,
    pub is_organizer: bool,
    pub user_response: Option<Rsvp>,
}

impl EventView {
    pub fn for_viewer(event: Event, viewer: &str) -> Self {
        let is_organizer = event.organizer == viewer;

        let (user_role, user_response) = if is_organizer {
            (AttendeeRole::Organizer, None)
        } else {
            match event.attendance_of(viewer) {
                Some(entry) => (entry.role, entry.response),
                // Should not occur for correctly-scoped queries; fall back
                // to the plain-attendee view.
                None => (AttendeeRole::Attendee, None),
            }
        };

        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            organizer: event.organizer,
            attendees: event.attendees,
            created_at: event.created_at,
            user_role,
            is_organizer,
            user_response,
        }
    }
}

/// Strict `YYYY-MM-DD` parsing shared by event creation and the search
/// filters. Rejects both malformed shapes and impossible calendar dates.
pub fn parse_event_date(raw: &str, field_name: &str) -> Result<NaiveDate, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "{} cannot be empty",
            field_name
        )));
    }

    let well_shaped = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return Err(AppError::ValidationError(format!(
            "{} must be in YYYY-MM-DD format (e.g., 2024-12-25)",
            field_name
        )));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        AppError::ValidationError(format!(
            "{} is not a valid date. Use YYYY-MM-DD format.",
            field_name
        ))
    })
}
