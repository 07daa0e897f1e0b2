//! Services module
//!
//! This module contains business logic services

pub mod event;
pub mod geo;

// Re-export commonly used services
pub use event::EventService;
pub use geo::GeoService;

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::database::EventStorage;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub geo_service: GeoService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, storage: Arc<dyn EventStorage>) -> Result<Self> {
        let event_service = EventService::new(storage);
        let geo_service = GeoService::new(settings)?;

        Ok(Self {
            event_service,
            geo_service,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        ServiceHealthStatus {
            storage_healthy: self.event_service.health_check().await,
            weather_risk_enabled: self.geo_service.is_enabled(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub storage_healthy: bool,
    pub weather_risk_enabled: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.storage_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.storage_healthy {
            issues.push("Storage backend unreachable".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryEventStore;

    #[tokio::test]
    async fn test_factory_health_check() {
        let factory = ServiceFactory::new(
            Settings::default(),
            Arc::new(MemoryEventStore::new()),
        )
        .unwrap();

        let status = factory.health_check().await;
        assert!(status.is_healthy());
        assert!(status.get_issues().is_empty());
    }
}
