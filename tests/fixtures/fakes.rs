//! In-memory fakes for every external collaborator.

use std::cell::RefCell;

use trip_planner::PlannerError;
use trip_planner::model::{Address, DistanceMatrix, MatrixUpdate, Route, RouteCandidates};
use trip_planner::traits::{
    AddressValidator, DirectionsProvider, DirectionsRequest, DirectionsRoute, DistanceMatrixProvider,
    MatrixUpdater, RouteLeg, RouteSolver, TravelMode, UnitSystem,
};

use super::irvine_addresses::IRVINE_PLACES;

/// Validates the fixture places by their short text; rejects anything else.
#[derive(Default)]
pub struct FakeValidator {
    pub calls: RefCell<Vec<String>>,
}

impl AddressValidator for FakeValidator {
    fn validate_address(&self, raw: &str) -> Result<Address, PlannerError> {
        self.calls.borrow_mut().push(raw.to_string());
        IRVINE_PLACES
            .iter()
            .find(|place| place.text == raw)
            .map(|place| place.address())
            .ok_or_else(|| PlannerError::ValidationFailed("Address could not be validated.".to_string()))
    }
}

/// Validates any text as an address at the origin.
pub struct EchoValidator;

impl AddressValidator for EchoValidator {
    fn validate_address(&self, raw: &str) -> Result<Address, PlannerError> {
        Ok(Address::new(raw.replace(' ', "+"), 0.0, 0.0))
    }
}

pub struct RejectingUpdater;

impl MatrixUpdater for RejectingUpdater {
    fn update_distance_matrix(
        &self,
        _new_address: &Address,
        _current_matrix: &DistanceMatrix,
        _addresses: &[Address],
    ) -> Result<MatrixUpdate, PlannerError> {
        Err(PlannerError::UpdateFailed("matrix service unavailable".to_string()))
    }
}

/// Forgets to append the new address.
pub struct ForgetfulUpdater;

impl MatrixUpdater for ForgetfulUpdater {
    fn update_distance_matrix(
        &self,
        _new_address: &Address,
        current_matrix: &DistanceMatrix,
        addresses: &[Address],
    ) -> Result<MatrixUpdate, PlannerError> {
        Ok(MatrixUpdate {
            distance_matrix: current_matrix.clone(),
            addresses: addresses.to_vec(),
        })
    }
}

/// Returns the same candidates for every matrix.
pub struct FixedSolver {
    pub candidates: RouteCandidates,
}

impl FixedSolver {
    pub fn new(routes: Vec<(Vec<usize>, f64)>) -> Self {
        let routes: Vec<Route> = routes
            .into_iter()
            .map(|(stops, distance)| Route { stops, distance })
            .collect();
        let total_distance = routes.iter().map(|route| route.distance).sum();
        Self {
            candidates: RouteCandidates { routes, total_distance },
        }
    }
}

impl RouteSolver for FixedSolver {
    fn compute_routes(&self, _matrix: &DistanceMatrix) -> Result<RouteCandidates, PlannerError> {
        Ok(self.candidates.clone())
    }
}

pub struct FailingSolver;

impl RouteSolver for FailingSolver {
    fn compute_routes(&self, _matrix: &DistanceMatrix) -> Result<RouteCandidates, PlannerError> {
        Err(PlannerError::SolverFailed("Could not calculate routes.".to_string()))
    }
}

/// Scripted mapping provider.
///
/// Directions return `legs` and `waypoint_order` (identity when unset).
/// Matrix queries return `matrix_meters` between every distinct pair.
/// Every call is recorded by service name.
pub struct FakeMaps {
    pub directions_status: &'static str,
    pub matrix_status: &'static str,
    pub legs: Vec<RouteLeg>,
    pub waypoint_order: Option<Vec<usize>>,
    pub matrix_meters: u64,
    pub calls: RefCell<Vec<&'static str>>,
    pub requests: RefCell<Vec<DirectionsRequest>>,
    pub matrix_modes: RefCell<Vec<TravelMode>>,
}

impl FakeMaps {
    pub fn with_legs(legs: &[(u64, u64)]) -> Self {
        Self {
            directions_status: "OK",
            matrix_status: "OK",
            legs: legs
                .iter()
                .map(|&(duration_secs, distance_meters)| RouteLeg {
                    duration_secs,
                    distance_meters,
                })
                .collect(),
            waypoint_order: None,
            matrix_meters: 1500,
            calls: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
            matrix_modes: RefCell::new(Vec::new()),
        }
    }

    pub fn waypoint_order(mut self, order: &[usize]) -> Self {
        self.waypoint_order = Some(order.to_vec());
        self
    }

    pub fn directions_status(mut self, status: &'static str) -> Self {
        self.directions_status = status;
        self
    }

    pub fn matrix_status(mut self, status: &'static str) -> Self {
        self.matrix_status = status;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl DirectionsProvider for FakeMaps {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, PlannerError> {
        self.calls.borrow_mut().push("directions");
        self.requests.borrow_mut().push(request.clone());
        if self.directions_status != "OK" {
            return Err(PlannerError::ProviderRoutingFailed {
                status: self.directions_status.to_string(),
                message: String::new(),
            });
        }
        Ok(DirectionsRoute {
            legs: self.legs.clone(),
            waypoint_order: self
                .waypoint_order
                .clone()
                .unwrap_or_else(|| (0..request.waypoints.len()).collect()),
        })
    }
}

impl DistanceMatrixProvider for FakeMaps {
    fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
        mode: TravelMode,
        _units: UnitSystem,
    ) -> Result<Vec<Vec<Option<u64>>>, PlannerError> {
        self.calls.borrow_mut().push("matrix");
        self.matrix_modes.borrow_mut().push(mode);
        if self.matrix_status != "OK" {
            return Err(PlannerError::ProviderMatrixFailed {
                status: self.matrix_status.to_string(),
                message: String::new(),
            });
        }
        Ok(origins
            .iter()
            .map(|origin| {
                destinations
                    .iter()
                    .map(|destination| Some(if origin == destination { 0 } else { self.matrix_meters }))
                    .collect()
            })
            .collect())
    }
}
