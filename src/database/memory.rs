//! In-memory storage backend
//!
//! Keeps the whole store behind a single async mutex. Every operation runs
//! inside one lock scope, which gives join and leave the same atomicity the
//! Postgres backend gets from its transaction.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use crate::database::backend::EventStorage;
use crate::models::{Event, Enrollment, CreateEventRequest};
use crate::utils::errors::{JoinMyError, Result};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    events: HashMap<i64, Event>,
    enrollments: HashMap<(i64, String), Enrollment>,
}

#[derive(Clone, Default)]
pub struct MemoryEventStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(event: &Event, query: &str) -> bool {
    let query = query.to_lowercase();
    if event.name.to_lowercase().contains(&query) {
        return true;
    }
    event
        .description
        .as_deref()
        .map(|description| description.to_lowercase().contains(&query))
        .unwrap_or(false)
}

#[async_trait]
impl EventStorage for MemoryEventStore {
    async fn insert_event(&self, request: CreateEventRequest) -> Result<Event> {
        let mut state = self.state.lock().await;
        state.next_id += 1;

        let event = Event {
            id: state.next_id,
            name: request.name,
            organizer: request.organizer,
            description: request.description,
            latitude: request.latitude,
            longitude: request.longitude,
            scheduled_at: request.scheduled_at,
            capacity: request.capacity,
            enrolled: 0,
            cancellation_risk: request.cancellation_risk,
            created_at: Utc::now(),
        };

        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        let state = self.state.lock().await;
        Ok(state.events.get(&event_id).cloned())
    }

    async fn list(&self, filter: Option<&str>) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| filter.map(|query| matches_filter(event, query)).unwrap_or(true))
            .cloned()
            .collect();

        events.sort_by_key(|event| event.scheduled_at);
        Ok(events)
    }

    async fn add_enrollment(&self, user_id: &str, event_id: i64) -> Result<Enrollment> {
        let mut state = self.state.lock().await;

        let (capacity, enrolled) = match state.events.get(&event_id) {
            Some(event) => (event.capacity, event.enrolled),
            None => return Err(JoinMyError::EventNotFound { event_id }),
        };

        let key = (event_id, user_id.to_string());
        if state.enrollments.contains_key(&key) {
            return Err(JoinMyError::AlreadyEnrolled {
                user_id: user_id.to_string(),
                event_id,
            });
        }

        if enrolled >= capacity {
            return Err(JoinMyError::EventFull { event_id });
        }

        let enrollment = Enrollment {
            user_id: user_id.to_string(),
            event_id,
            joined_at: Utc::now(),
        };

        state.enrollments.insert(key, enrollment.clone());
        if let Some(event) = state.events.get_mut(&event_id) {
            event.enrolled += 1;
        }

        Ok(enrollment)
    }

    async fn remove_enrollment(&self, user_id: &str, event_id: i64) -> Result<()> {
        let mut state = self.state.lock().await;

        if !state.events.contains_key(&event_id) {
            return Err(JoinMyError::EventNotFound { event_id });
        }

        let key = (event_id, user_id.to_string());
        if state.enrollments.remove(&key).is_none() {
            return Err(JoinMyError::NotEnrolled {
                user_id: user_id.to_string(),
                event_id,
            });
        }

        if let Some(event) = state.events.get_mut(&event_id) {
            event.enrolled = (event.enrolled - 1).max(0);
        }

        Ok(())
    }

    async fn is_enrolled(&self, user_id: &str, event_id: i64) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.enrollments.contains_key(&(event_id, user_id.to_string())))
    }

    async fn user_events(&self, user_id: &str) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        let mut events: Vec<Event> = state
            .enrollments
            .keys()
            .filter(|(_, enrolled_user)| enrolled_user == user_id)
            .filter_map(|(event_id, _)| state.events.get(event_id).cloned())
            .collect();

        events.sort_by_key(|event| event.scheduled_at);
        Ok(events)
    }

    async fn enrollment_count(&self, event_id: i64) -> Result<i64> {
        let state = self.state.lock().await;
        let count = state
            .enrollments
            .keys()
            .filter(|(enrolled_event, _)| *enrolled_event == event_id)
            .count();

        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn yoga_request(capacity: i32) -> CreateEventRequest {
        CreateEventRequest {
            name: "Yoga".to_string(),
            organizer: "Alice".to_string(),
            description: Some("Morning yoga in the park".to_string()),
            latitude: 47.42,
            longitude: 9.37,
            scheduled_at: Utc::now(),
            capacity,
            cancellation_risk: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_fresh_ids() {
        let store = MemoryEventStore::new();
        let first = store.insert_event(yoga_request(5)).await.unwrap();
        let second = store.insert_event(yoga_request(5)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.enrolled, 0);
        assert_eq!(second.enrolled, 0);
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive() {
        let store = MemoryEventStore::new();
        store.insert_event(yoga_request(5)).await.unwrap();

        assert_eq!(store.list(Some("YOGA")).await.unwrap().len(), 1);
        assert_eq!(store.list(Some("park")).await.unwrap().len(), 1);
        assert_eq!(store.list(Some("football")).await.unwrap().len(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        // Random join/leave sequences never break the counter invariants:
        // 0 <= enrolled <= capacity, and enrolled equals the number of
        // enrollment records.
        #[test]
        fn prop_enrolled_matches_enrollment_count(
            ops in proptest::collection::vec((0..4u8, proptest::bool::ANY), 1..60)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();

            rt.block_on(async {
                let store = MemoryEventStore::new();
                let event = store.insert_event(yoga_request(3)).await.unwrap();

                for (user_index, join) in ops {
                    let user_id = format!("user-{}", user_index);
                    if join {
                        let _ = store.add_enrollment(&user_id, event.id).await;
                    } else {
                        let _ = store.remove_enrollment(&user_id, event.id).await;
                    }

                    let current = store.find_by_id(event.id).await.unwrap().unwrap();
                    let count = store.enrollment_count(event.id).await.unwrap();
                    assert!(current.enrolled >= 0);
                    assert!(current.enrolled <= current.capacity);
                    assert_eq!(current.enrolled as i64, count);
                }
            });
        }
    }
}
