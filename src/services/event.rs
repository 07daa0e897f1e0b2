//! Event service implementation
//!
//! This service is the single source of truth for events and enrollment
//! records. It validates creation input, delegates persistence to the
//! configured storage backend, and keeps the participant counter consistent
//! with the enrollment set.

use std::sync::Arc;
use tracing::{info, debug};
use crate::database::EventStorage;
use crate::models::{Event, Enrollment, Coordinates, CreateEventRequest};
use crate::utils::errors::{JoinMyError, Result};
use crate::utils::helpers::normalize_whitespace;
use crate::utils::logging;

/// Event store service for managing events and enrollments
#[derive(Clone)]
pub struct EventService {
    storage: Arc<dyn EventStorage>,
}

impl EventService {
    /// Create a new EventService instance backed by the given storage
    pub fn new(storage: Arc<dyn EventStorage>) -> Self {
        Self { storage }
    }

    /// Create a new event
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        debug!(name = %request.name, organizer = %request.organizer, "Creating event");

        validate_create_request(&request)?;

        let event = self.storage.insert_event(request).await?;
        logging::log_event_action(event.id, "created", Some(&event.name));
        info!(event_id = event.id, capacity = event.capacity, "Event created successfully");

        Ok(event)
    }

    /// Get a single event by id
    pub async fn get_event(&self, event_id: i64) -> Result<Option<Event>> {
        debug!(event_id = event_id, "Getting event by id");
        self.storage.find_by_id(event_id).await
    }

    /// List events, optionally filtered by a case-insensitive substring
    /// match against name or description
    pub async fn list_events(&self, filter: Option<&str>) -> Result<Vec<Event>> {
        let normalized = filter.map(normalize_whitespace);
        let normalized = normalized.as_deref().filter(|query| !query.is_empty());

        debug!(filter = normalized, "Listing events");
        self.storage.list(normalized).await
    }

    /// Enroll a user into an event
    pub async fn join_event(&self, user_id: &str, event_id: i64) -> Result<Enrollment> {
        debug!(user_id = user_id, event_id = event_id, "Joining event");

        validate_user_id(user_id)?;

        let enrollment = self.storage.add_enrollment(user_id, event_id).await?;
        logging::log_enrollment_action(event_id, user_id, "joined", None);

        Ok(enrollment)
    }

    /// Remove a user's enrollment from an event
    pub async fn leave_event(&self, user_id: &str, event_id: i64) -> Result<()> {
        debug!(user_id = user_id, event_id = event_id, "Leaving event");

        validate_user_id(user_id)?;

        self.storage.remove_enrollment(user_id, event_id).await?;
        logging::log_enrollment_action(event_id, user_id, "left", None);

        Ok(())
    }

    /// Check whether a user is enrolled in an event
    pub async fn is_enrolled(&self, user_id: &str, event_id: i64) -> Result<bool> {
        self.storage.is_enrolled(user_id, event_id).await
    }

    /// List every event the user is enrolled in
    pub async fn list_user_enrollments(&self, user_id: &str) -> Result<Vec<Event>> {
        debug!(user_id = user_id, "Listing user enrollments");

        validate_user_id(user_id)?;
        self.storage.user_events(user_id).await
    }

    /// Check that the storage backend answers queries
    pub async fn health_check(&self) -> bool {
        self.storage.list(None).await.is_ok()
    }
}

fn validate_create_request(request: &CreateEventRequest) -> Result<()> {
    if request.name.trim().is_empty() {
        logging::log_validation_failure("create_event", "empty name");
        return Err(JoinMyError::InvalidInput("Event name must not be empty".to_string()));
    }

    if request.organizer.trim().is_empty() {
        logging::log_validation_failure("create_event", "empty organizer");
        return Err(JoinMyError::InvalidInput("Event organizer must not be empty".to_string()));
    }

    if request.capacity < 1 {
        logging::log_validation_failure("create_event", "non-positive capacity");
        return Err(JoinMyError::InvalidInput(format!(
            "Capacity must be a positive integer, got {}",
            request.capacity
        )));
    }

    let coordinates = Coordinates {
        latitude: request.latitude,
        longitude: request.longitude,
    };
    if !coordinates.is_valid() {
        logging::log_validation_failure("create_event", "coordinates out of bounds");
        return Err(JoinMyError::InvalidInput(format!(
            "Location ({}, {}) is not a valid coordinate pair",
            request.latitude, request.longitude
        )));
    }

    if let Some(risk) = request.cancellation_risk {
        if !(0..=100).contains(&risk) {
            logging::log_validation_failure("create_event", "risk out of range");
            return Err(JoinMyError::InvalidInput(format!(
                "Cancellation risk must be between 0 and 100, got {}",
                risk
            )));
        }
    }

    Ok(())
}

fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        logging::log_validation_failure("enrollment", "empty user id");
        return Err(JoinMyError::InvalidInput("User id must not be empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use crate::database::MemoryEventStore;

    fn service() -> EventService {
        EventService::new(Arc::new(MemoryEventStore::new()))
    }

    fn request() -> CreateEventRequest {
        CreateEventRequest {
            name: "Ride to Zurich".to_string(),
            organizer: "Tanja Musterfrau".to_string(),
            description: Some("Carpool to Zurich".to_string()),
            latitude: 47.431,
            longitude: 9.378,
            scheduled_at: Utc::now(),
            capacity: 3,
            cancellation_risk: Some(5),
        }
    }

    #[tokio::test]
    async fn test_create_event_rejects_empty_name() {
        let service = service();
        let request = CreateEventRequest { name: "  ".to_string(), ..request() };

        let result = service.create_event(request).await;
        assert_matches!(result, Err(JoinMyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_event_rejects_non_positive_capacity() {
        let service = service();
        let request = CreateEventRequest { capacity: 0, ..request() };

        let result = service.create_event(request).await;
        assert_matches!(result, Err(JoinMyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_event_rejects_out_of_bounds_location() {
        let service = service();
        let request = CreateEventRequest { latitude: 123.4, ..request() };

        let result = service.create_event(request).await;
        assert_matches!(result, Err(JoinMyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_event_rejects_out_of_range_risk() {
        let service = service();
        let request = CreateEventRequest { cancellation_risk: Some(140), ..request() };

        let result = service.create_event(request).await;
        assert_matches!(result, Err(JoinMyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_join_rejects_empty_user_id() {
        let service = service();
        let event = service.create_event(request()).await.unwrap();

        let result = service.join_event("", event.id).await;
        assert_matches!(result, Err(JoinMyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_filter_is_normalized_before_lookup() {
        let service = service();
        service.create_event(request()).await.unwrap();

        let events = service.list_events(Some("  ride   to ")).await.unwrap();
        assert_eq!(events.len(), 1);

        // An all-whitespace filter means no filter at all
        let events = service.list_events(Some("   ")).await.unwrap();
        assert_eq!(events.len(), 1);
    }
}
