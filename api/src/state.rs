use std::sync::Arc;
use std::time::Instant;

use prometheus::Registry;

use crate::admin::SessionStore;
use crate::config::AppConfig;
use crate::geo::{GeoError, LocationClient};
use crate::registration::Registrar;
use crate::storage::RegistrationStore;
use crate::validation::{Clock, SystemClock};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RegistrationStore>,
    pub registrar: Arc<Registrar>,
    pub clock: Arc<dyn Clock>,
    pub locations: Arc<LocationClient>,
    pub sessions: SessionStore,
    pub started_at: Instant,
    pub registry: Registry,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        config: &AppConfig,
        registry: Registry,
    ) -> Result<Self, GeoError> {
        Self::with_clock(store, Arc::new(SystemClock), config, registry)
    }

    /// Same as [`AppState::new`] with an explicit source of "today"
    pub fn with_clock(
        store: Arc<dyn RegistrationStore>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
        registry: Registry,
    ) -> Result<Self, GeoError> {
        Ok(Self {
            registrar: Arc::new(Registrar::new(store.clone(), clock.clone())),
            store,
            clock,
            locations: Arc::new(LocationClient::new(&config.geo)?),
            sessions: SessionStore::new(config.admin.session_ttl),
            started_at: Instant::now(),
            registry,
        })
    }
}
