//! Error handling for JoinMy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for JoinMy application
#[derive(Error, Debug)]
pub enum JoinMyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Geo lookup error: {0}")]
    Geo(#[from] GeoError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("User {user_id} is already enrolled in event {event_id}")]
    AlreadyEnrolled { user_id: String, event_id: i64 },

    #[error("Event {event_id} has reached its capacity")]
    EventFull { event_id: i64 },

    #[error("User {user_id} is not enrolled in event {event_id}")]
    NotEnrolled { user_id: String, event_id: i64 },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Geocoding and weather lookup specific errors
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Lookup request failed: {0}")]
    RequestFailed(String),

    #[error("Lookup request timed out")]
    Timeout,

    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),

    #[error("Lookup service unavailable")]
    ServiceUnavailable,
}

/// Result type alias for JoinMy operations
pub type Result<T> = std::result::Result<T, JoinMyError>;

/// Result type alias for geo lookup operations
pub type GeoResult<T> = std::result::Result<T, GeoError>;

impl JoinMyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            JoinMyError::Database(_) => false,
            JoinMyError::Migration(_) => false,
            JoinMyError::Geo(_) => true,
            JoinMyError::Config(_) => false,
            JoinMyError::EventNotFound { .. } => false,
            JoinMyError::AlreadyEnrolled { .. } => false,
            JoinMyError::EventFull { .. } => true,
            JoinMyError::NotEnrolled { .. } => false,
            JoinMyError::Http(_) => true,
            JoinMyError::Serialization(_) => false,
            JoinMyError::Io(_) => true,
            JoinMyError::InvalidInput(_) => false,
            JoinMyError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            JoinMyError::Database(_) => ErrorSeverity::Critical,
            JoinMyError::Migration(_) => ErrorSeverity::Critical,
            JoinMyError::Config(_) => ErrorSeverity::Critical,
            JoinMyError::EventNotFound { .. } => ErrorSeverity::Warning,
            JoinMyError::AlreadyEnrolled { .. } => ErrorSeverity::Info,
            JoinMyError::EventFull { .. } => ErrorSeverity::Info,
            JoinMyError::NotEnrolled { .. } => ErrorSeverity::Info,
            JoinMyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
