//! In-process matrix rebuilds through a [`DistanceMatrixProvider`].
//!
//! Mirrors what the planning backend does on `/update_distance_matrix`: the
//! full matrix is fetched again for every new address, in row chunks small
//! enough for the provider's per-request element limit, then symmetrised
//! into whole kilometers.

use tracing::debug;

use crate::error::PlannerError;
use crate::model::{Address, DistanceMatrix, MatrixUpdate};
use crate::traits::{DistanceMatrixProvider, MatrixUpdater, TravelMode, UnitSystem};

/// Provider limit on origins x destinations per request.
pub const DEFAULT_MAX_ELEMENTS: usize = 100;

#[derive(Debug, Clone)]
pub struct ProviderMatrixUpdater<P> {
    provider: P,
    max_elements: usize,
}

impl<P> ProviderMatrixUpdater<P>
where
    P: DistanceMatrixProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }

    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Fetch the raw (meters) matrix for `addresses`.
    pub fn fetch_meters(&self, addresses: &[Address]) -> Result<Vec<Vec<u64>>, PlannerError> {
        let n = addresses.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let labels: Vec<String> = addresses.iter().map(Address::label).collect();
        let rows_per_request = (self.max_elements / n).max(1);
        let mut matrix = Vec::with_capacity(n);

        for (chunk_index, origins) in labels.chunks(rows_per_request).enumerate() {
            debug!(chunk = chunk_index, rows = origins.len(), "fetching matrix rows");
            let rows = self
                .provider
                .distance_matrix(origins, &labels, TravelMode::Driving, UnitSystem::Imperial)?;
            if rows.len() != origins.len() {
                return Err(PlannerError::matrix(
                    "OK",
                    format!("expected {} rows, got {}", origins.len(), rows.len()),
                ));
            }

            for (offset, row) in rows.into_iter().enumerate() {
                let i = chunk_index * rows_per_request + offset;
                let row = row
                    .into_iter()
                    .enumerate()
                    .map(|(j, meters)| {
                        meters.ok_or_else(|| {
                            PlannerError::matrix("OK", format!("no distance from {:?} to {:?}", labels[i], labels[j]))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if row.len() != n {
                    return Err(PlannerError::matrix(
                        "OK",
                        format!("row {} has {} entries, expected {}", i, row.len(), n),
                    ));
                }
                matrix.push(row);
            }
        }

        Ok(matrix)
    }
}

impl<P> MatrixUpdater for ProviderMatrixUpdater<P>
where
    P: DistanceMatrixProvider,
{
    fn update_distance_matrix(
        &self,
        new_address: &Address,
        _current_matrix: &DistanceMatrix,
        addresses: &[Address],
    ) -> Result<MatrixUpdate, PlannerError> {
        let mut addresses = addresses.to_vec();
        addresses.push(new_address.clone());

        let meters = self.fetch_meters(&addresses)?;
        let distance_matrix = DistanceMatrix::from_rows(symmetrize(&meters))?;

        Ok(MatrixUpdate {
            distance_matrix,
            addresses,
        })
    }
}

/// Average each pair of directions and convert to whole kilometers.
pub fn symmetrize(meters: &[Vec<u64>]) -> Vec<Vec<f64>> {
    let n = meters.len();
    let mut km = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let average = (meters[i][j] + meters[j][i]) as f64 / 2.0;
            let value = round_half_up(average / 1000.0);
            km[i][j] = value;
            km[j][i] = value;
        }
    }
    km
}

/// Round to the nearest whole number, halves going up.
pub fn round_half_up(value: f64) -> f64 {
    if value.fract() >= 0.5 { value.ceil() } else { value.floor() }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Distances are 1000 * |i - j| meters, with a 200 m detour going backwards.
    struct LineProvider {
        calls: RefCell<Vec<usize>>,
    }

    fn position(label: &str) -> u64 {
        label.trim_start_matches("Stop ").parse().unwrap()
    }

    impl DistanceMatrixProvider for LineProvider {
        fn distance_matrix(
            &self,
            origins: &[String],
            destinations: &[String],
            _mode: TravelMode,
            _units: UnitSystem,
        ) -> Result<Vec<Vec<Option<u64>>>, PlannerError> {
            self.calls.borrow_mut().push(origins.len() * destinations.len());
            Ok(origins
                .iter()
                .map(|o| {
                    destinations
                        .iter()
                        .map(|d| {
                            let (a, b) = (position(o), position(d));
                            Some(if a <= b { (b - a) * 1000 } else { (a - b) * 1000 + 200 })
                        })
                        .collect()
                })
                .collect())
        }
    }

    fn addresses(n: usize) -> Vec<Address> {
        (0..n).map(|i| Address::new(format!("Stop+{}", i), 0.0, 0.0)).collect()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(0.0), 0.0);
    }

    #[test]
    fn test_symmetrize_averages_and_rounds() {
        let km = symmetrize(&[vec![0, 1000], vec![2000, 0]]);
        assert_eq!(km, vec![vec![0.0, 2.0], vec![2.0, 0.0]]);
    }

    #[test]
    fn test_update_appends_and_sizes_matrix() {
        let updater = ProviderMatrixUpdater::new(LineProvider {
            calls: RefCell::new(Vec::new()),
        });
        let existing = addresses(3);
        let new_address = Address::new("Stop+3", 0.0, 0.0);
        let update = updater
            .update_distance_matrix(&new_address, &DistanceMatrix::empty(), &existing)
            .unwrap();

        assert_eq!(update.addresses.len(), 4);
        assert_eq!(update.addresses[3], new_address);
        assert_eq!(update.distance_matrix.size(), 4);
        // (3000 + 3200) / 2 = 3100 m -> 3 km
        assert_eq!(update.distance_matrix.get(0, 3), Some(3.0));
        assert_eq!(update.distance_matrix.get(3, 0), Some(3.0));
    }

    #[test]
    fn test_requests_respect_element_limit() {
        let updater = ProviderMatrixUpdater::new(LineProvider {
            calls: RefCell::new(Vec::new()),
        })
        .with_max_elements(10);
        let meters = updater.fetch_meters(&addresses(4)).unwrap();

        assert_eq!(meters.len(), 4);
        assert_eq!(meters[2][1], 1200);
        let calls = updater.provider.calls.borrow();
        // 10 / 4 = 2 rows per request
        assert_eq!(*calls, vec![8, 8]);
    }

    #[test]
    fn test_unreachable_pair_fails() {
        struct Unroutable;
        impl DistanceMatrixProvider for Unroutable {
            fn distance_matrix(
                &self,
                origins: &[String],
                destinations: &[String],
                _mode: TravelMode,
                _units: UnitSystem,
            ) -> Result<Vec<Vec<Option<u64>>>, PlannerError> {
                Ok(vec![vec![None; destinations.len()]; origins.len()])
            }
        }

        let updater = ProviderMatrixUpdater::new(Unroutable);
        let result = updater.update_distance_matrix(&Address::new("A", 0.0, 0.0), &DistanceMatrix::empty(), &[]);
        assert!(matches!(result, Err(PlannerError::ProviderMatrixFailed { .. })));
    }
}
