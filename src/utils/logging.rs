//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the JoinMy application.

use tracing::{info, debug, error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "joinmy.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log enrollment actions with structured data
pub fn log_enrollment_action(event_id: i64, user_id: &str, action: &str, details: Option<&str>) {
    info!(
        event_id = event_id,
        user_id = user_id,
        action = action,
        details = details,
        "Enrollment action performed"
    );
}

/// Log event lifecycle actions
pub fn log_event_action(event_id: i64, action: &str, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        details = details,
        "Event action performed"
    );
}

/// Log rejected input with context
pub fn log_validation_failure(operation: &str, reason: &str) {
    warn!(
        operation = operation,
        reason = reason,
        "Input validation failed"
    );
}

/// Log lookup API errors with context
pub fn log_lookup_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "Lookup API error occurred"
    );
}

/// Log storage operations
pub fn log_storage_operation(operation: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            duration_ms = duration_ms,
            "Storage operation completed"
        );
    } else {
        error!(
            operation = operation,
            duration_ms = duration_ms,
            "Storage operation failed"
        );
    }
}
