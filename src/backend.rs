//! HTTP adapter for the planning backend service.
//!
//! The backend owns address validation, matrix construction and route
//! solving. Every endpoint answers `200` with a `status` field; anything
//! other than `"success"` is a rejection carrying an optional message.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::PlannerError;
use crate::model::{Address, DistanceMatrix, MatrixUpdate, Route, RouteCandidates};
use crate::traits::{AddressValidator, MatrixUpdater, RouteSolver};

const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone)]
pub struct BackendClient {
    config: BackendConfig,
    client: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, PlannerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, PlannerError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!(%url, "backend request");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<R>())?;

        Ok(response)
    }
}

impl AddressValidator for BackendClient {
    fn validate_address(&self, raw: &str) -> Result<Address, PlannerError> {
        let response: ValidateResponse = self.post("validate_address", &ValidateRequest { address: raw })?;
        response.into_address()
    }
}

impl MatrixUpdater for BackendClient {
    fn update_distance_matrix(
        &self,
        new_address: &Address,
        current_matrix: &DistanceMatrix,
        addresses: &[Address],
    ) -> Result<MatrixUpdate, PlannerError> {
        let request = UpdateRequest {
            new_address,
            current_matrix,
            addresses,
        };
        let response: UpdateResponse = self.post("update_distance_matrix", &request)?;
        response.into_update()
    }
}

impl RouteSolver for BackendClient {
    fn compute_routes(&self, matrix: &DistanceMatrix) -> Result<RouteCandidates, PlannerError> {
        let response: RoutesResponse = self.post(
            "calculate_routes",
            &RoutesRequest {
                distance_matrix: matrix,
            },
        )?;
        response.into_candidates()
    }
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    status: String,
    validated_address: Option<Address>,
    message: Option<String>,
}

impl ValidateResponse {
    fn into_address(self) -> Result<Address, PlannerError> {
        match (self.status.as_str(), self.validated_address) {
            (STATUS_SUCCESS, Some(address)) => Ok(address),
            (STATUS_SUCCESS, None) => Err(PlannerError::ValidationFailed(
                "response carried no validated address".to_string(),
            )),
            _ => {
                let message = self.message.unwrap_or_else(|| format!("status {}", self.status));
                warn!(%message, "address rejected by backend");
                Err(PlannerError::ValidationFailed(message))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    new_address: &'a Address,
    current_matrix: &'a DistanceMatrix,
    addresses: &'a [Address],
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    status: String,
    distance_matrix: Option<DistanceMatrix>,
    addresses: Option<Vec<Address>>,
    message: Option<String>,
}

impl UpdateResponse {
    fn into_update(self) -> Result<MatrixUpdate, PlannerError> {
        if self.status != STATUS_SUCCESS {
            let message = self.message.unwrap_or_else(|| format!("status {}", self.status));
            warn!(%message, "matrix update rejected by backend");
            return Err(PlannerError::UpdateFailed(message));
        }

        match (self.distance_matrix, self.addresses) {
            (Some(distance_matrix), Some(addresses)) => Ok(MatrixUpdate {
                distance_matrix,
                addresses,
            }),
            _ => Err(PlannerError::UpdateFailed(
                "response is missing the matrix or the address list".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct RoutesRequest<'a> {
    distance_matrix: &'a DistanceMatrix,
}

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Vec<usize>>,
    #[serde(default)]
    route_distances: Vec<f64>,
    #[serde(default)]
    total_distance: f64,
    message: Option<String>,
}

impl RoutesResponse {
    fn into_candidates(self) -> Result<RouteCandidates, PlannerError> {
        if self.status != STATUS_SUCCESS {
            let message = self.message.unwrap_or_else(|| format!("status {}", self.status));
            warn!(%message, "route computation rejected by backend");
            return Err(PlannerError::SolverFailed(message));
        }

        if self.routes.len() != self.route_distances.len() {
            return Err(PlannerError::SolverFailed(format!(
                "{} routes but {} route distances",
                self.routes.len(),
                self.route_distances.len()
            )));
        }

        let routes = self
            .routes
            .into_iter()
            .zip(self.route_distances)
            .map(|(stops, distance)| Route { stops, distance })
            .collect();

        Ok(RouteCandidates {
            routes,
            total_distance: self.total_distance,
        })
    }
}
