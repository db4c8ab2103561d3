//! Country, state and city lookup
//!
//! With an API key the countrystatecity.in API is queried and successful
//! responses are cached. Without a key, or when the upstream call fails,
//! small built-in tables are served instead so the form stays usable.

use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use shared::Location;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GeoConfig;
use crate::metrics;

const API_KEY_HEADER: &str = "X-CSCAPI-KEY";
const CACHE_CAPACITY: u64 = 1_024;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to build location client: {0}")]
    Client(reqwest::Error),
    #[error("location API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("location API returned {0}")]
    Status(StatusCode),
}

/// Body served by the location endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LocationPayload {
    Upstream(Value),
    Fallback(Vec<Location>),
}

impl LocationPayload {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LocationPayload::Fallback(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Resource {
    Countries,
    States,
    Cities,
}

impl Resource {
    fn as_str(self) -> &'static str {
        match self {
            Resource::Countries => "countries",
            Resource::States => "states",
            Resource::Cities => "cities",
        }
    }
}

pub struct LocationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: Cache<String, Value>,
}

impl LocationClient {
    pub fn new(config: &GeoConfig) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GeoError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(config.cache_ttl.max(Duration::from_secs(1)))
                .build(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn countries(&self) -> LocationPayload {
        self.lookup(Resource::Countries, "/countries".to_string(), fallback_countries)
            .await
    }

    pub async fn states(&self, country_id: i64) -> LocationPayload {
        self.lookup(
            Resource::States,
            format!("/countries/{country_id}/states"),
            || fallback_states(country_id),
        )
        .await
    }

    pub async fn cities(&self, country_id: i64, state_id: i64) -> LocationPayload {
        self.lookup(
            Resource::Cities,
            format!("/countries/{country_id}/states/{state_id}/cities"),
            || fallback_cities(state_id),
        )
        .await
    }

    async fn lookup<F>(&self, resource: Resource, path: String, fallback: F) -> LocationPayload
    where
        F: FnOnce() -> Vec<Location>,
    {
        let Some(api_key) = self.api_key.as_deref() else {
            metrics::observe_geo_lookup(resource.as_str(), "fallback");
            return LocationPayload::Fallback(fallback());
        };

        if let Some(hit) = self.cache.get(&path).await {
            debug!(path = %path, "location cache hit");
            metrics::observe_geo_lookup(resource.as_str(), "cache");
            return LocationPayload::Upstream(hit);
        }

        match self.fetch(&path, api_key).await {
            Ok(body) => {
                self.cache.insert(path, body.clone()).await;
                metrics::observe_geo_lookup(resource.as_str(), "upstream");
                LocationPayload::Upstream(body)
            }
            Err(err) => {
                warn!(resource = resource.as_str(), error = %err, "location API unavailable, serving fallback");
                metrics::observe_geo_lookup(resource.as_str(), "fallback");
                LocationPayload::Fallback(fallback())
            }
        }
    }

    async fn fetch(&self, path: &str, api_key: &str) -> Result<Value, GeoError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status));
        }
        Ok(response.json::<Value>().await?)
    }
}

pub fn fallback_countries() -> Vec<Location> {
    vec![
        Location::country(101, "India", "IN"),
        Location::country(231, "United States", "US"),
        Location::country(230, "United Kingdom", "GB"),
        Location::country(38, "Canada", "CA"),
        Location::country(13, "Australia", "AU"),
    ]
}

pub fn fallback_states(country_id: i64) -> Vec<Location> {
    match country_id {
        101 => vec![
            Location::new(4026, "Karnataka"),
            Location::new(4023, "Maharashtra"),
            Location::new(4035, "Tamil Nadu"),
            Location::new(4008, "Delhi"),
        ],
        231 => vec![
            Location::new(3919, "California"),
            Location::new(3951, "New York"),
            Location::new(3970, "Texas"),
            Location::new(3932, "Florida"),
        ],
        _ => vec![Location::new(0, "State Selection Not Available (No API Key)")],
    }
}

pub fn fallback_cities(state_id: i64) -> Vec<Location> {
    let names: &[&str] = match state_id {
        4026 => &["Bangalore", "Mysore", "Hubli"],
        4023 => &["Mumbai", "Pune", "Nagpur"],
        3919 => &["Los Angeles", "San Francisco", "San Diego"],
        3951 => &["New York City", "Buffalo", "Albany"],
        _ => return vec![Location::new(0, "City Selection Not Available")],
    };
    let first_id = match state_id {
        4026 => 1,
        4023 => 4,
        3919 => 7,
        _ => 10,
    };
    names
        .iter()
        .zip(first_id..)
        .map(|(name, id)| Location::new(id, *name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>, base_url: &str) -> LocationClient {
        LocationClient::new(&GeoConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[test]
    fn test_fallback_tables() {
        assert_eq!(fallback_countries().len(), 5);
        assert_eq!(fallback_states(101)[0], Location::new(4026, "Karnataka"));
        assert_eq!(fallback_states(999)[0].id, 0);
        assert_eq!(
            fallback_cities(4023),
            vec![
                Location::new(4, "Mumbai"),
                Location::new(5, "Pune"),
                Location::new(6, "Nagpur")
            ]
        );
        assert_eq!(fallback_cities(3951)[2], Location::new(12, "Albany"));
        assert_eq!(fallback_cities(1)[0].name, "City Selection Not Available");
    }

    #[tokio::test]
    async fn test_without_key_serves_fallback() {
        let client = client(None, "http://127.0.0.1:9");
        let payload = client.countries().await;
        assert!(payload.is_fallback());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json[0]["name"], "India");
        assert_eq!(json[0]["iso2"], "IN");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_falls_back() {
        let client = client(Some("key"), "http://127.0.0.1:9");
        let payload = client.states(231).await;
        assert_eq!(
            payload,
            LocationPayload::Fallback(fallback_states(231))
        );
    }
}
