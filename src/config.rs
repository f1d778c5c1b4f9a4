//! Connection settings for the backend service and the mapping provider.

use std::env;

use crate::error::PlannerError;
use crate::traits::{TrafficModel, TravelMode, UnitSystem};

pub const BACKEND_URL_VAR: &str = "TRIP_PLANNER_BACKEND_URL";
pub const TIMEOUT_VAR: &str = "TRIP_PLANNER_TIMEOUT_SECS";
pub const MAPS_API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const MAPS_BASE_URL_VAR: &str = "GOOGLE_MAPS_BASE_URL";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl MapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: api_key.into(),
            timeout_secs: 10,
        }
    }
}

/// Provider options used when summarizing a trip.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub travel_mode: TravelMode,
    pub units: UnitSystem,
    pub traffic_model: TrafficModel,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::Driving,
            units: UnitSystem::Imperial,
            traffic_model: TrafficModel::Pessimistic,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub backend: BackendConfig,
    /// Unset when no API key is configured.
    pub maps: Option<MapsConfig>,
    pub summary: SummaryOptions,
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BACKEND_URL_VAR) {
            config.backend.base_url = url.trim_end_matches('/').to_string();
        }

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PlannerError::Config(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, raw))
            })?,
            None => config.backend.timeout_secs,
        };
        config.backend.timeout_secs = timeout_secs;

        config.maps = lookup(MAPS_API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                let mut maps = MapsConfig::new(key);
                if let Some(url) = lookup(MAPS_BASE_URL_VAR) {
                    maps.base_url = url.trim_end_matches('/').to_string();
                }
                maps.timeout_secs = timeout_secs;
                maps
            });

        Ok(config)
    }
}
