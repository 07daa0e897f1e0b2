//! Storage backend abstraction
//!
//! A single capability interface over the event and enrollment collections.
//! Join and leave are backend primitives: the capacity check and the counter
//! update must be indivisible per event, so they cannot be composed from
//! separate calls by the service layer.

use async_trait::async_trait;
use crate::models::{Event, Enrollment, CreateEventRequest};
use crate::utils::errors::Result;

#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Persist a new event with `enrolled = 0` and a fresh id
    async fn insert_event(&self, request: CreateEventRequest) -> Result<Event>;

    /// Fetch a single event by id
    async fn find_by_id(&self, event_id: i64) -> Result<Option<Event>>;

    /// List events, optionally filtered by a case-insensitive substring
    /// match against name or description. Returns a snapshot, not a live view.
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Event>>;

    /// Enroll a user into an event, incrementing the participant counter.
    /// Fails with `EventNotFound`, `AlreadyEnrolled` or `EventFull` without
    /// mutating state. The duplicate check, the capacity check and the
    /// increment happen atomically.
    async fn add_enrollment(&self, user_id: &str, event_id: i64) -> Result<Enrollment>;

    /// Remove a user's enrollment, decrementing the participant counter
    /// (never below 0). Fails with `EventNotFound` or `NotEnrolled` without
    /// mutating state.
    async fn remove_enrollment(&self, user_id: &str, event_id: i64) -> Result<()>;

    /// Check whether a user is enrolled in an event
    async fn is_enrolled(&self, user_id: &str, event_id: i64) -> Result<bool>;

    /// List every event the user is enrolled in. Enrollments whose event no
    /// longer exists are silently omitted.
    async fn user_events(&self, user_id: &str) -> Result<Vec<Event>>;

    /// Number of enrollment records for an event
    async fn enrollment_count(&self, event_id: i64) -> Result<i64>;
}
