use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use crate::models::{Attendance, Event, NewEvent, User};
use crate::store::{EventFilter, EventStore, StoreError, UserStore};

/// In-memory store backend with the same observable semantics as
/// [`PgStore`]. Used by the test suites; no persistence.
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    events: RwLock<BTreeMap<i64, Event>>,
    next_event_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            events: RwLock::new(BTreeMap::new()),
            // Ids are allocated from 1, like the production sequence.
            next_event_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<bool, StoreError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.email) {
            return Ok(false);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(true)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(email).cloned())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError> {
        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            organizer: event.organizer,
            attendees: event.attendees,
            created_at: event.created_at,
        };
        self.events.write().unwrap().insert(id, event);
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().unwrap().get(&id).cloned())
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().unwrap();
        Ok(events
            .values()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect())
    }

    async fn append_attendee(
        &self,
        id: i64,
        attendee: &Attendance,
    ) -> Result<bool, StoreError> {
        let mut events = self.events.write().unwrap();
        match events.get_mut(&id) {
            Some(event) => {
                event.attendees.push(attendee.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_attendees(
        &self,
        id: i64,
        attendees: &[Attendance],
    ) -> Result<bool, StoreError> {
        let mut events = self.events.write().unwrap();
        match events.get_mut(&id) {
            Some(event) => {
                event.attendees = attendees.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.events.write().unwrap().remove(&id).is_some())
    }
}
