//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub organizer: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_at: DateTime<Utc>,
    pub capacity: i32,
    pub enrolled: i32,
    pub cancellation_risk: Option<i16>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Check whether the event has no open slots left
    pub fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }

    /// Number of slots still available
    pub fn open_slots(&self) -> i32 {
        (self.capacity - self.enrolled).max(0)
    }
}

/// A latitude/longitude pair, as produced by geocoding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Check that the pair lies within valid WGS84 bounds
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub organizer: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_at: DateTime<Utc>,
    pub capacity: i32,
    pub cancellation_risk: Option<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(capacity: i32, enrolled: i32) -> Event {
        Event {
            id: 1,
            name: "Football Match".to_string(),
            organizer: "Max Mustermann".to_string(),
            description: Some("Friendly football match open to all!".to_string()),
            latitude: 47.425,
            longitude: 9.376,
            scheduled_at: Utc::now(),
            capacity,
            enrolled,
            cancellation_risk: Some(10),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_slots() {
        assert_eq!(sample_event(20, 7).open_slots(), 13);
        assert_eq!(sample_event(3, 3).open_slots(), 0);
    }

    #[test]
    fn test_is_full() {
        assert!(!sample_event(20, 7).is_full());
        assert!(sample_event(3, 3).is_full());
    }

    #[test]
    fn test_coordinates_bounds() {
        assert!(Coordinates { latitude: 47.4239, longitude: 9.3748 }.is_valid());
        assert!(!Coordinates { latitude: 91.0, longitude: 9.3748 }.is_valid());
        assert!(!Coordinates { latitude: 47.4239, longitude: -181.0 }.is_valid());
    }
}
