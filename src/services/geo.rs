//! Geocoding and weather lookup service
//!
//! Wraps the third-party HTTP APIs used when creating events: a
//! Nominatim-style geocoder for turning free-text addresses into
//! coordinates, and an Open-Meteo-style forecast endpoint for estimating
//! the cancellation risk from precipitation probability. The store treats
//! both outputs as plain input values.

use chrono::NaiveDate;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, debug};
use crate::config::settings::Settings;
use crate::models::Coordinates;
use crate::utils::errors::{JoinMyError, GeoError, GeoResult, Result};
use crate::utils::logging;

#[derive(Debug, Clone, Deserialize)]
struct GeocodeEntry {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    daily: ForecastDaily,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastDaily {
    precipitation_probability_max: Vec<Option<f64>>,
}

/// Geo lookup service for address and forecast resolution
#[derive(Clone)]
pub struct GeoService {
    settings: Settings,
    http_client: reqwest::Client,
}

impl GeoService {
    /// Create a new GeoService instance
    pub fn new(settings: Settings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.geo.timeout_seconds))
            .user_agent("JoinMy/0.1")
            .build()
            .map_err(JoinMyError::Http)?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    /// Whether forecast-based risk estimation is enabled
    pub fn is_enabled(&self) -> bool {
        self.settings.features.weather_risk
    }

    /// Resolve a free-text address to coordinates. Returns `Ok(None)` when
    /// the geocoder has no match for the address.
    pub async fn geocode(&self, address: &str) -> GeoResult<Option<Coordinates>> {
        debug!(address = %address, "Geocoding address");

        let response = self
            .http_client
            .get(&self.settings.geo.geocoding_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                logging::log_lookup_error("geocoding", &e.to_string(), Some(address));
                if e.is_timeout() {
                    GeoError::Timeout
                } else {
                    GeoError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            logging::log_lookup_error("geocoding", response.status().as_str(), Some(address));
            return Err(GeoError::ServiceUnavailable);
        }

        let entries: Vec<GeocodeEntry> = response
            .json()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        let entry = match entries.first() {
            Some(entry) => entry,
            None => {
                info!(address = %address, "Geocoder returned no match");
                return Ok(None);
            }
        };

        let latitude: f64 = entry
            .lat
            .parse()
            .map_err(|_| GeoError::InvalidResponse(format!("bad latitude: {}", entry.lat)))?;
        let longitude: f64 = entry
            .lon
            .parse()
            .map_err(|_| GeoError::InvalidResponse(format!("bad longitude: {}", entry.lon)))?;

        let coordinates = Coordinates { latitude, longitude };
        if !coordinates.is_valid() {
            return Err(GeoError::InvalidResponse(format!(
                "coordinates out of bounds: ({}, {})",
                latitude, longitude
            )));
        }

        debug!(latitude = latitude, longitude = longitude, "Address geocoded");
        Ok(Some(coordinates))
    }

    /// Estimate the cancellation risk (0-100) for an event at the given
    /// location and date. With forecast lookups disabled, a random low-range
    /// estimate is assigned instead.
    pub async fn cancellation_risk(&self, coordinates: Coordinates, date: NaiveDate) -> GeoResult<i16> {
        if !self.is_enabled() {
            let risk = fallback_risk();
            debug!(risk = risk, "Forecast lookup disabled, assigned random risk");
            return Ok(risk);
        }

        let day = date.format("%Y-%m-%d").to_string();
        let response = self
            .http_client
            .get(&self.settings.geo.forecast_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("daily", "precipitation_probability_max".to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
            ])
            .send()
            .await
            .map_err(|e| {
                logging::log_lookup_error("forecast", &e.to_string(), None);
                if e.is_timeout() {
                    GeoError::Timeout
                } else {
                    GeoError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            logging::log_lookup_error("forecast", response.status().as_str(), None);
            return Err(GeoError::ServiceUnavailable);
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        let probability = forecast
            .daily
            .precipitation_probability_max
            .first()
            .copied()
            .flatten();

        let risk = match probability {
            Some(value) => value.round().clamp(0.0, 100.0) as i16,
            // The forecast horizon does not cover the event date
            None => fallback_risk(),
        };

        debug!(risk = risk, "Cancellation risk estimated");
        Ok(risk)
    }
}

fn fallback_risk() -> i16 {
    rand::thread_rng().gen_range(0..=30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wiremock::matchers::{method, path};

    async fn service_with(server: &MockServer, weather_risk: bool) -> GeoService {
        let mut settings = Settings::default();
        settings.geo.geocoding_url = format!("{}/search", server.uri());
        settings.geo.forecast_url = format!("{}/forecast", server.uri());
        settings.features.weather_risk = weather_risk;
        GeoService::new(settings).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_parses_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "47.4239", "lon": "9.3748"}
            ])))
            .mount(&server)
            .await;

        let service = service_with(&server, true).await;
        let coordinates = service.geocode("St. Gallen").await.unwrap().unwrap();

        assert!((coordinates.latitude - 47.4239).abs() < 1e-9);
        assert!((coordinates.longitude - 9.3748).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geocode_no_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let service = service_with(&server, true).await;
        assert!(service.geocode("nowhere at all").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_geocode_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = service_with(&server, true).await;
        let result = service.geocode("St. Gallen").await;
        assert!(matches!(result, Err(GeoError::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_cancellation_risk_from_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {"precipitation_probability_max": [62.0]}
            })))
            .mount(&server)
            .await;

        let service = service_with(&server, true).await;
        let coordinates = Coordinates { latitude: 47.42, longitude: 9.37 };
        let date = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();

        let risk = service.cancellation_risk(coordinates, date).await.unwrap();
        assert_eq!(risk, 62);
    }

    #[tokio::test]
    async fn test_cancellation_risk_disabled_uses_fallback_range() {
        let server = MockServer::start().await;
        let service = service_with(&server, false).await;
        let coordinates = Coordinates { latitude: 47.42, longitude: 9.37 };
        let date = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();

        let risk = service.cancellation_risk(coordinates, date).await.unwrap();
        assert!((0..=30).contains(&risk));
    }
}
