//! Seams for the planner's external collaborators.
//!
//! The backend service and the mapping provider sit behind these traits so
//! the pipeline can run against HTTP clients, in-process implementations,
//! or test fakes.

use crate::error::PlannerError;
use crate::model::{Address, DistanceMatrix, MatrixUpdate, RouteCandidates};

/// Validates and geocodes raw address text.
pub trait AddressValidator {
    fn validate_address(&self, raw: &str) -> Result<Address, PlannerError>;
}

/// Rebuilds the distance matrix after an address is added.
///
/// Implementations return the full replacement state: the address list with
/// `new_address` appended and a matrix sized to it.
pub trait MatrixUpdater {
    fn update_distance_matrix(
        &self,
        new_address: &Address,
        current_matrix: &DistanceMatrix,
        addresses: &[Address],
    ) -> Result<MatrixUpdate, PlannerError>;
}

/// Proposes vehicle routes over a distance matrix.
pub trait RouteSolver {
    fn compute_routes(&self, matrix: &DistanceMatrix) -> Result<RouteCandidates, PlannerError>;
}

/// Turn-by-turn routing with waypoint optimization.
pub trait DirectionsProvider {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, PlannerError>;
}

/// Pairwise distances between free-text places.
///
/// Returns one row per origin and one entry per destination, in meters.
/// `None` marks a pair the provider could not route.
pub trait DistanceMatrixProvider {
    fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
        mode: TravelMode,
        units: UnitSystem,
    ) -> Result<Vec<Vec<Option<u64>>>, PlannerError>;
}

/// A routing request for one origin, one destination and ordered waypoints.
///
/// Waypoints are always stopovers.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<String>,
    pub optimize_waypoints: bool,
    pub provide_alternatives: bool,
    pub travel_mode: TravelMode,
    pub units: UnitSystem,
    pub traffic_model: TrafficModel,
    pub departure: DepartureTime,
}

/// The first route of a successful routing response.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    pub legs: Vec<RouteLeg>,
    /// Optimized visiting order, as indices into the request's waypoints.
    pub waypoint_order: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteLeg {
    pub duration_secs: u64,
    pub distance_meters: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
}

impl TravelMode {
    pub fn as_param(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn as_param(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficModel {
    BestGuess,
    Pessimistic,
    Optimistic,
}

impl TrafficModel {
    pub fn as_param(&self) -> &'static str {
        match self {
            TrafficModel::BestGuess => "best_guess",
            TrafficModel::Pessimistic => "pessimistic",
            TrafficModel::Optimistic => "optimistic",
        }
    }
}

/// Departure time for traffic-aware routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureTime {
    Now,
    /// Unix timestamp in seconds.
    At(u64),
}

impl DepartureTime {
    pub fn as_param(&self) -> String {
        match self {
            DepartureTime::Now => "now".to_string(),
            DepartureTime::At(timestamp) => timestamp.to_string(),
        }
    }
}
