//! Enrollment model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub user_id: String,
    pub event_id: i64,
    pub joined_at: DateTime<Utc>,
}
