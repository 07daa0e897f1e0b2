//! Postgres storage backend

use async_trait::async_trait;
use sqlx::PgPool;
use chrono::Utc;
use crate::database::backend::EventStorage;
use crate::models::{Event, Enrollment, CreateEventRequest};
use crate::utils::errors::{JoinMyError, Result};

#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStorage for PostgresEventStore {
    async fn insert_event(&self, request: CreateEventRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, organizer, description, latitude, longitude, scheduled_at, capacity, enrolled, cancellation_risk, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9)
            RETURNING id, name, organizer, description, latitude, longitude, scheduled_at, capacity, enrolled, cancellation_risk, created_at
            "#
        )
        .bind(request.name)
        .bind(request.organizer)
        .bind(request.description)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.scheduled_at)
        .bind(request.capacity)
        .bind(request.cancellation_risk)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, name, organizer, description, latitude, longitude, scheduled_at, capacity, enrolled, cancellation_risk, created_at FROM events WHERE id = $1"
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(&self, filter: Option<&str>) -> Result<Vec<Event>> {
        let events = match filter {
            Some(query) => {
                let pattern = format!("%{}%", query);
                sqlx::query_as::<_, Event>(
                    "SELECT id, name, organizer, description, latitude, longitude, scheduled_at, capacity, enrolled, cancellation_risk, created_at FROM events WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY scheduled_at ASC"
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Event>(
                    "SELECT id, name, organizer, description, latitude, longitude, scheduled_at, capacity, enrolled, cancellation_risk, created_at FROM events ORDER BY scheduled_at ASC"
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(events)
    }

    async fn add_enrollment(&self, user_id: &str, event_id: i64) -> Result<Enrollment> {
        let mut tx = self.pool.begin().await?;

        let event: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;
        if event.is_none() {
            return Err(JoinMyError::EventNotFound { event_id });
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (user_id, event_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING user_id, event_id, joined_at
            "#
        )
        .bind(user_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let enrollment = match enrollment {
            Some(enrollment) => enrollment,
            None => {
                return Err(JoinMyError::AlreadyEnrolled {
                    user_id: user_id.to_string(),
                    event_id,
                })
            }
        };

        // The row count of the conditional update is the capacity check:
        // concurrent joins serialize on the event row lock, and a stale
        // counter can never be incremented past capacity.
        let updated = sqlx::query(
            "UPDATE events SET enrolled = enrolled + 1 WHERE id = $1 AND enrolled < capacity"
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(JoinMyError::EventFull { event_id });
        }

        tx.commit().await?;
        Ok(enrollment)
    }

    async fn remove_enrollment(&self, user_id: &str, event_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let event: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;
        if event.is_none() {
            return Err(JoinMyError::EventNotFound { event_id });
        }

        let deleted = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(JoinMyError::NotEnrolled {
                user_id: user_id.to_string(),
                event_id,
            });
        }

        sqlx::query("UPDATE events SET enrolled = enrolled - 1 WHERE id = $1 AND enrolled > 0")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn is_enrolled(&self, user_id: &str, event_id: i64) -> Result<bool> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE user_id = $1 AND event_id = $2"
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    async fn user_events(&self, user_id: &str) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.name, e.organizer, e.description, e.latitude, e.longitude, e.scheduled_at, e.capacity, e.enrolled, e.cancellation_risk, e.created_at
            FROM events e
            INNER JOIN enrollments en ON e.id = en.event_id
            WHERE en.user_id = $1
            ORDER BY e.scheduled_at ASC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn enrollment_count(&self, event_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
