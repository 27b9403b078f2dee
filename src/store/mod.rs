use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Attendance, AttendeeRole, Event, NewEvent, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}

/// Predicates for event queries. Both backends implement the same
/// semantics: all set fields must hold (logical AND).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventFilter {
    /// Organizer equals this identity.
    pub organizer: Option<String>,
    /// This identity appears anywhere in the attendee list.
    pub member: Option<String>,
    /// This identity appears in the attendee list with role `attendee`.
    pub invited: Option<String>,
    /// Organizer is NOT this identity.
    pub exclude_organizer: Option<String>,
    /// Case-insensitive literal substring of title or description.
    pub keyword: Option<String>,
    /// Inclusive lower bound on the event date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the event date.
    pub date_to: Option<NaiveDate>,
}

impl EventFilter {
    pub fn organized_by(email: &str) -> Self {
        Self {
            organizer: Some(email.to_string()),
            ..Self::default()
        }
    }

    pub fn member_of(email: &str) -> Self {
        Self {
            member: Some(email.to_string()),
            ..Self::default()
        }
    }

    pub fn invited_to(email: &str) -> Self {
        Self {
            invited: Some(email.to_string()),
            ..Self::default()
        }
    }

    /// Reference semantics of the filter, used directly by the in-memory
    /// backend. The SQL backend must stay observably equivalent.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(organizer) = &self.organizer {
            if &event.organizer != organizer {
                return false;
            }
        }
        if let Some(excluded) = &self.exclude_organizer {
            if &event.organizer == excluded {
                return false;
            }
        }
        if let Some(member) = &self.member {
            if !event.is_member(member) {
                return false;
            }
        }
        if let Some(invited) = &self.invited {
            let as_attendee = event
                .attendees
                .iter()
                .any(|a| &a.email == invited && a.role == AttendeeRole::Attendee);
            if !as_attendee {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let in_title = event.title.to_lowercase().contains(&needle);
            let in_description = event.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if event.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if event.date > to {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Returns `false` when the email is already
    /// registered (the insert is then a no-op).
    async fn insert(&self, user: &User) -> Result<bool, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event and returns its allocated id. Id allocation is
    /// atomic and monotonically increasing from 1.
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, StoreError>;

    /// Events matching the filter, in id order. Records whose stored
    /// attendee data fails to decode are skipped, not fatal.
    async fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError>;

    /// Atomically appends one attendee to the event's sequence. Returns
    /// `false` if the event no longer exists.
    async fn append_attendee(&self, id: i64, attendee: &Attendance)
        -> Result<bool, StoreError>;

    /// Replaces the whole attendee sequence (read-modify-write used for
    /// response updates). Returns `false` if the event no longer exists.
    async fn replace_attendees(
        &self,
        id: i64,
        attendees: &[Attendance],
    ) -> Result<bool, StoreError>;

    /// Hard delete. Returns `false` if the event no longer exists.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
