//! Session entities: addresses, the distance matrix, and route candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// A validated address with its coordinates.
///
/// `formatted_address` is kept exactly as the validation service returned
/// it, which encodes spaces as `+`. Use [`Address::label`] for display and
/// for provider queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Address {
    pub fn new(formatted_address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            latitude,
            longitude,
        }
    }

    /// Human-readable address text.
    pub fn label(&self) -> String {
        self.formatted_address.replace('+', " ")
    }

    /// Location as (lat, lng).
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Square table of distances indexed by address position.
///
/// Symmetry is not required. The square shape is checked whenever a matrix
/// is built, including when one is deserialized from a service response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct DistanceMatrix {
    rows: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PlannerError> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(PlannerError::InvalidMatrix(format!(
                "row {} has {} columns, expected {}",
                i,
                row.len(),
                n
            )));
        }
        Ok(Self { rows })
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.rows.get(from).and_then(|row| row.get(to)).copied()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for DistanceMatrix {
    type Error = PlannerError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<DistanceMatrix> for Vec<Vec<f64>> {
    fn from(matrix: DistanceMatrix) -> Self {
        matrix.rows
    }
}

/// Replacement state returned by a matrix rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixUpdate {
    pub distance_matrix: DistanceMatrix,
    pub addresses: Vec<Address>,
}

/// One vehicle's visiting order, as address indices, with its distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<usize>,
    pub distance: f64,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .stops
            .iter()
            .map(|stop| stop.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        f.write_str(&joined)
    }
}

/// Candidate routes produced by a solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidates {
    pub routes: Vec<Route>,
    pub total_distance: f64,
}

impl RouteCandidates {
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Route, PlannerError> {
        self.routes.get(index).ok_or(PlannerError::UnknownRoute {
            index,
            count: self.routes.len(),
        })
    }

    pub fn per_route_distances(&self) -> Vec<f64> {
        self.routes.iter().map(|route| route.distance).collect()
    }
}

/// The stops of a selected route, projected to address text.
///
/// This is the payload carried into the map screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripStops {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<String>,
}

impl TripStops {
    /// Project route indices onto address labels.
    ///
    /// The first index is the origin, the last the destination, and
    /// everything in between a waypoint.
    pub fn from_route(route: &Route, addresses: &[Address]) -> Result<Self, PlannerError> {
        let labels = route
            .stops
            .iter()
            .map(|&index| {
                addresses
                    .get(index)
                    .map(Address::label)
                    .ok_or(PlannerError::InvalidStop {
                        index,
                        count: addresses.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (origin, rest) = labels.split_first().ok_or(PlannerError::InvalidStop {
            index: 0,
            count: addresses.len(),
        })?;
        let destination = rest.last().unwrap_or(origin).clone();
        let waypoints = if rest.is_empty() {
            Vec::new()
        } else {
            rest[..rest.len() - 1].to_vec()
        };

        Ok(Self {
            origin: origin.clone(),
            destination,
            waypoints,
        })
    }
}
