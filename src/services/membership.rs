use std::sync::Arc;

use crate::models::{Attendance, EventView};
use crate::store::{EventFilter, EventStore, UserStore};
use crate::utils::error::AppError;

/// Membership of events: organizer-only invitations plus the read-only
/// listing projections.
pub struct Membership {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
}

impl Membership {
    pub fn new(events: Arc<dyn EventStore>, users: Arc<dyn UserStore>) -> Self {
        Self { events, users }
    }

    /// Adds a registered user to an event's attendee list. A repeat invite
    /// is an error, not a no-op.
    pub async fn invite(
        &self,
        viewer: &str,
        event_id: i64,
        invitee: &str,
    ) -> Result<(), AppError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.organizer != viewer {
            tracing::warn!(event_id, viewer, "Invite attempt by non-organizer");
            return Err(AppError::Forbidden(
                "Only the event organizer can invite users to this event".to_string(),
            ));
        }

        if event.is_member(invitee) {
            return Err(AppError::Conflict(
                "User already invited to this event".to_string(),
            ));
        }

        if self.users.find_by_email(invitee).await?.is_none() {
            tracing::warn!(event_id, invitee, "Invite rejected, email not registered");
            return Err(AppError::NotFound(
                "User with this email does not exist. Please invite only registered users."
                    .to_string(),
            ));
        }

        // The event may have been deleted between the read and the append.
        if !self
            .events
            .append_attendee(event_id, &Attendance::attendee(invitee))
            .await?
        {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        tracing::info!(event_id, invitee, organizer = viewer, "User invited");
        Ok(())
    }

    /// Events the viewer organizes.
    pub async fn my_events(&self, viewer: &str) -> Result<Vec<EventView>, AppError> {
        self.project(viewer, EventFilter::organized_by(viewer)).await
    }

    /// Events the viewer organizes or attends. The organizer is always a
    /// member of their own event, so membership alone covers both.
    pub async fn events_for_user(&self, viewer: &str) -> Result<Vec<EventView>, AppError> {
        self.project(viewer, EventFilter::member_of(viewer)).await
    }

    /// Events the viewer was invited to as a non-organizer attendee.
    pub async fn invited_events(&self, viewer: &str) -> Result<Vec<EventView>, AppError> {
        self.project(viewer, EventFilter::invited_to(viewer)).await
    }

    async fn project(
        &self,
        viewer: &str,
        filter: EventFilter,
    ) -> Result<Vec<EventView>, AppError> {
        let events = self.events.find(&filter).await?;
        Ok(events
            .into_iter()
            .map(|event| EventView::for_viewer(event, viewer))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendeeRole, User};
    use crate::services::lifecycle::{EventFields, EventLifecycle};
    use crate::store::MemoryStore;
    use chrono::Utc;

    struct Fixture {
        lifecycle: EventLifecycle,
        membership: Membership,
        store: Arc<MemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            lifecycle: EventLifecycle::new(store.clone()),
            membership: Membership::new(store.clone(), store.clone()),
            store,
        }
    }

    async fn register(store: &MemoryStore, email: &str) {
        UserStore::insert(
            store,
            &User {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    async fn create_event(fixture: &Fixture, organizer: &str, title: &str) -> i64 {
        fixture
            .lifecycle
            .create_event(
                organizer,
                EventFields {
                    title: title.to_string(),
                    description: "desc".to_string(),
                    date: "2024-06-01".to_string(),
                    time: "18:00".to_string(),
                    location: "HQ".to_string(),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn invite_appends_an_attendee_without_response() {
        let f = fixture();
        register(&f.store, "bob@example.com").await;
        let id = create_event(&f, "ana@example.com", "Picnic").await;

        f.membership
            .invite("ana@example.com", id, "bob@example.com")
            .await
            .unwrap();

        let event = f.store.find_by_id(id).await.unwrap().unwrap();
        let bob = event.attendance_of("bob@example.com").unwrap();
        assert_eq!(bob.role, AttendeeRole::Attendee);
        assert_eq!(bob.response, None);
    }

    #[tokio::test]
    async fn invite_requires_an_existing_event() {
        let f = fixture();
        register(&f.store, "bob@example.com").await;

        let err = f
            .membership
            .invite("ana@example.com", 99, "bob@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn invite_is_organizer_only() {
        let f = fixture();
        register(&f.store, "bob@example.com").await;
        register(&f.store, "carol@example.com").await;
        let id = create_event(&f, "ana@example.com", "Picnic").await;
        f.membership
            .invite("ana@example.com", id, "bob@example.com")
            .await
            .unwrap();

        // Neither an attendee nor an outsider may invite.
        for caller in ["bob@example.com", "eve@example.com"] {
            let err = f
                .membership
                .invite(caller, id, "carol@example.com")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)), "caller {}", caller);
        }
    }

    #[tokio::test]
    async fn repeat_invite_is_a_conflict_and_leaves_the_list_unchanged() {
        let f = fixture();
        register(&f.store, "bob@example.com").await;
        let id = create_event(&f, "ana@example.com", "Picnic").await;

        f.membership
            .invite("ana@example.com", id, "bob@example.com")
            .await
            .unwrap();
        let before = f.store.find_by_id(id).await.unwrap().unwrap().attendees.len();

        let err = f
            .membership
            .invite("ana@example.com", id, "bob@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let after = f.store.find_by_id(id).await.unwrap().unwrap().attendees.len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn inviting_the_organizer_is_a_conflict() {
        let f = fixture();
        register(&f.store, "ana@example.com").await;
        let id = create_event(&f, "ana@example.com", "Picnic").await;

        let err = f
            .membership
            .invite("ana@example.com", id, "ana@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn invites_are_restricted_to_registered_users() {
        let f = fixture();
        let id = create_event(&f, "ana@example.com", "Picnic").await;

        let err = f
            .membership
            .invite("ana@example.com", id, "ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let event = f.store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(event.attendees.len(), 1);
    }

    #[tokio::test]
    async fn listings_project_by_role() {
        let f = fixture();
        register(&f.store, "ana@example.com").await;
        register(&f.store, "bob@example.com").await;

        let organized = create_event(&f, "ana@example.com", "Ana's party").await;
        let invited_to = create_event(&f, "bob@example.com", "Bob's dinner").await;
        f.membership
            .invite("bob@example.com", invited_to, "ana@example.com")
            .await
            .unwrap();

        let mine = f.membership.my_events("ana@example.com").await.unwrap();
        assert_eq!(
            mine.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![organized]
        );

        let all = f.membership.events_for_user("ana@example.com").await.unwrap();
        assert_eq!(
            all.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![organized, invited_to]
        );

        let invited = f.membership.invited_events("ana@example.com").await.unwrap();
        assert_eq!(
            invited.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![invited_to]
        );
        assert!(!invited[0].is_organizer);
        assert_eq!(invited[0].user_role, AttendeeRole::Attendee);
    }
}
