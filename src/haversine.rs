//! Haversine matrix rebuilds (fallback when no mapping provider is configured).
//!
//! Uses great-circle distance between the validated coordinates.
//! Less accurate than provider road distances but always available.

use crate::error::PlannerError;
use crate::matrix::round_half_up;
use crate::model::{Address, DistanceMatrix, MatrixUpdate};
use crate::traits::MatrixUpdater;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Multiplier applied to straight-line distances.
const DEFAULT_DETOUR_FACTOR: f64 = 1.0;

/// Haversine-based matrix updater.
///
/// Produces a symmetric matrix of whole kilometers, scaled by a detour factor.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    pub detour_factor: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            detour_factor: DEFAULT_DETOUR_FACTOR,
        }
    }
}

impl HaversineMatrix {
    pub fn new(detour_factor: f64) -> Self {
        Self { detour_factor }
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    pub fn matrix_for(&self, addresses: &[Address]) -> Vec<Vec<f64>> {
        let n = addresses.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for (i, from) in addresses.iter().enumerate() {
            for (j, to) in addresses.iter().enumerate().skip(i + 1) {
                let km = round_half_up(Self::haversine_km(from.location(), to.location()) * self.detour_factor);
                matrix[i][j] = km;
                matrix[j][i] = km;
            }
        }

        matrix
    }
}

impl MatrixUpdater for HaversineMatrix {
    fn update_distance_matrix(
        &self,
        new_address: &Address,
        _current_matrix: &DistanceMatrix,
        addresses: &[Address],
    ) -> Result<MatrixUpdate, PlannerError> {
        let mut addresses = addresses.to_vec();
        addresses.push(new_address.clone());
        let distance_matrix = DistanceMatrix::from_rows(self.matrix_for(&addresses))?;

        Ok(MatrixUpdate {
            distance_matrix,
            addresses,
        })
    }
}
