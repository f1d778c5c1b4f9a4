//! HTTP adapter for the mapping provider's Directions and Distance Matrix services.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MapsConfig;
use crate::error::PlannerError;
use crate::traits::{
    DirectionsProvider, DirectionsRequest, DirectionsRoute, DistanceMatrixProvider, RouteLeg, TravelMode, UnitSystem,
};

const STATUS_OK: &str = "OK";

#[derive(Debug, Clone)]
pub struct MapsClient {
    config: MapsConfig,
    client: reqwest::blocking::Client,
}

impl MapsClient {
    pub fn new(config: MapsConfig) -> Result<Self, PlannerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn get<R>(&self, service: &str, params: &[(&str, String)]) -> Result<R, PlannerError>
    where
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}/json", self.config.base_url, service);
        debug!(%url, ?params, "maps request");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<R>())?;

        Ok(response)
    }
}

/// Query parameters for a directions request.
///
/// Waypoints are sent pipe-joined, prefixed with `optimize:true` when the
/// provider may reorder them.
pub fn directions_params(request: &DirectionsRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("origin", request.origin.clone()),
        ("destination", request.destination.clone()),
    ];

    if !request.waypoints.is_empty() {
        let mut parts = Vec::with_capacity(request.waypoints.len() + 1);
        if request.optimize_waypoints {
            parts.push("optimize:true".to_string());
        }
        parts.extend(request.waypoints.iter().cloned());
        params.push(("waypoints", parts.join("|")));
    }

    params.push(("alternatives", request.provide_alternatives.to_string()));
    params.push(("mode", request.travel_mode.as_param().to_string()));
    params.push(("units", request.units.as_param().to_string()));
    params.push(("traffic_model", request.traffic_model.as_param().to_string()));
    params.push(("departure_time", request.departure.as_param()));
    params
}

impl DirectionsProvider for MapsClient {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, PlannerError> {
        let response: DirectionsResponse = self.get("directions", &directions_params(request))?;
        response.into_route()
    }
}

impl DistanceMatrixProvider for MapsClient {
    fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
        mode: TravelMode,
        units: UnitSystem,
    ) -> Result<Vec<Vec<Option<u64>>>, PlannerError> {
        if origins.is_empty() || destinations.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("origins", origins.join("|")),
            ("destinations", destinations.join("|")),
            ("mode", mode.as_param().to_string()),
            ("units", units.as_param().to_string()),
        ];
        let response: MatrixResponse = self.get("distancematrix", &params)?;
        response.into_distances(origins.len(), destinations.len())
    }
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    legs: Vec<ApiLeg>,
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    duration: ValueField,
    distance: ValueField,
}

impl DirectionsResponse {
    fn into_route(self) -> Result<DirectionsRoute, PlannerError> {
        if self.status != STATUS_OK {
            let message = self.error_message.unwrap_or_default();
            warn!(status = %self.status, %message, "directions request failed");
            return Err(PlannerError::routing(self.status, message));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::routing(STATUS_OK, "response contained no routes"))?;

        Ok(DirectionsRoute {
            legs: route
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    duration_secs: leg.duration.value,
                    distance_meters: leg.distance.value,
                })
                .collect(),
            waypoint_order: route.waypoint_order,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<ApiRow>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRow {
    #[serde(default)]
    elements: Vec<ApiElement>,
}

#[derive(Debug, Deserialize)]
struct ApiElement {
    distance: Option<ValueField>,
}

impl MatrixResponse {
    fn into_distances(self, origins: usize, destinations: usize) -> Result<Vec<Vec<Option<u64>>>, PlannerError> {
        if self.status != STATUS_OK {
            let message = self.error_message.unwrap_or_default();
            warn!(status = %self.status, %message, "distance matrix request failed");
            return Err(PlannerError::matrix(self.status, message));
        }

        if self.rows.len() != origins || self.rows.iter().any(|row| row.elements.len() != destinations) {
            return Err(PlannerError::matrix(
                STATUS_OK,
                format!("expected a {}x{} matrix", origins, destinations),
            ));
        }

        Ok(self
            .rows
            .into_iter()
            .map(|row| {
                row.elements
                    .into_iter()
                    .map(|element| element.distance.map(|d| d.value))
                    .collect()
            })
            .collect())
    }
}
