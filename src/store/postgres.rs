use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, QueryBuilder, Row};

use crate::config::Config;
use crate::models::{Attendance, Event, NewEvent, User};
use crate::store::{EventFilter, EventStore, StoreError, UserStore};

const MAX_CONNECTIONS: u32 = 5;

const EVENT_COLUMNS: &str =
    "id, title, description, date, time, location, organizer, attendees, created_at";

/// Connects to Postgres with the configured bounded-retry policy: a fixed
/// delay between attempts, giving up after the last one.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let attempts = config.store_connect_attempts.max(1);

    let mut attempt = 1;
    loop {
        match PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    attempts,
                    error = %err,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(config.store_connect_delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Postgres-backed store. Events keep their attendee sequence embedded as
/// a JSONB column, so an event stays a single document: inserts, appends,
/// replaces and deletes each touch one row.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let id: i64 = row.try_get("id")?;
    let attendees_json: serde_json::Value = row.try_get("attendees")?;
    let attendees: Vec<Attendance> = serde_json::from_value(attendees_json)
        .map_err(|e| StoreError::Corrupt(format!("event {}: {}", id, e)))?;

    Ok(Event {
        id,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date: row.try_get::<NaiveDate, _>("date")?,
        time: row.try_get("time")?,
        location: row.try_get("location")?,
        organizer: row.try_get("organizer")?,
        attendees,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Escapes LIKE metacharacters so the keyword matches as a literal
/// substring.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn member_probe(email: &str) -> serde_json::Value {
    serde_json::json!([{ "email": email }])
}

fn invited_probe(email: &str) -> serde_json::Value {
    serde_json::json!([{ "email": email, "role": "attendee" }])
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError> {
        let attendees = serde_json::to_value(&event.attendees)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let row = sqlx::query(
            "INSERT INTO events (title, description, date, time, location, organizer, attendees, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(&event.organizer)
        .bind(attendees)
        .bind(event.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut query =
            QueryBuilder::new(format!("SELECT {} FROM events WHERE TRUE", EVENT_COLUMNS));

        if let Some(organizer) = &filter.organizer {
            query.push(" AND organizer = ").push_bind(organizer.as_str());
        }
        if let Some(excluded) = &filter.exclude_organizer {
            query.push(" AND organizer <> ").push_bind(excluded.as_str());
        }
        if let Some(member) = &filter.member {
            query
                .push(" AND attendees @> ")
                .push_bind(member_probe(member));
        }
        if let Some(invited) = &filter.invited {
            query
                .push(" AND attendees @> ")
                .push_bind(invited_probe(invited));
        }
        if let Some(keyword) = &filter.keyword {
            let pattern = like_pattern(keyword);
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(from) = filter.date_from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            query.push(" AND date <= ").push_bind(to);
        }
        query.push(" ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;

        // A record with undecodable attendee data degrades the listing,
        // not the whole request.
        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            match event_from_row(row) {
                Ok(event) => events.push(event),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping malformed event record");
                }
            }
        }
        Ok(events)
    }

    async fn append_attendee(
        &self,
        id: i64,
        attendee: &Attendance,
    ) -> Result<bool, StoreError> {
        let appended = serde_json::to_value(std::slice::from_ref(attendee))
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let result = sqlx::query("UPDATE events SET attendees = attendees || $2 WHERE id = $1")
            .bind(id)
            .bind(appended)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_attendees(
        &self,
        id: i64,
        attendees: &[Attendance],
    ) -> Result<bool, StoreError> {
        let attendees =
            serde_json::to_value(attendees).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let result = sqlx::query("UPDATE events SET attendees = $2 WHERE id = $1")
            .bind(id)
            .bind(attendees)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
