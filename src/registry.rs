//! Ordered collection of validated addresses and their distance matrix.

use tracing::{info, warn};

use crate::error::PlannerError;
use crate::model::{Address, DistanceMatrix};
use crate::traits::{AddressValidator, MatrixUpdater};

/// Addresses of one planning session, in the order they were added.
///
/// The matrix always has one row and one column per address. Addresses are
/// never removed; [`AddressRegistry::reset`] discards the whole session.
#[derive(Debug, Clone, Default)]
pub struct AddressRegistry {
    addresses: Vec<Address>,
    matrix: DistanceMatrix,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Validate `raw` and rebuild the matrix with the new address appended.
    ///
    /// State is replaced only once both the validator and the updater have
    /// succeeded and their result is consistent.
    pub fn add_address<V, U>(&mut self, raw: &str, validator: &V, updater: &U) -> Result<&Address, PlannerError>
    where
        V: AddressValidator + ?Sized,
        U: MatrixUpdater + ?Sized,
    {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PlannerError::ValidationFailed("address is empty".to_string()));
        }

        let validated = validator.validate_address(raw).inspect_err(|err| {
            warn!(address = raw, error = %err, "address validation failed");
        })?;

        let update = updater
            .update_distance_matrix(&validated, &self.matrix, &self.addresses)
            .inspect_err(|err| {
                warn!(address = raw, error = %err, "distance matrix update failed");
            })?;

        let expected = self.addresses.len() + 1;
        if update.addresses.len() != expected || update.distance_matrix.size() != expected {
            warn!(
                expected,
                addresses = update.addresses.len(),
                matrix = update.distance_matrix.size(),
                "inconsistent matrix update"
            );
            return Err(PlannerError::UpdateFailed(format!(
                "expected {} addresses and a {}x{} matrix, got {} addresses and a {}x{} matrix",
                expected,
                expected,
                expected,
                update.addresses.len(),
                update.distance_matrix.size(),
                update.distance_matrix.size()
            )));
        }

        self.addresses = update.addresses;
        self.matrix = update.distance_matrix;
        info!(count = self.addresses.len(), "address added");

        Ok(&self.addresses[self.addresses.len() - 1])
    }

    pub fn reset(&mut self) {
        self.addresses.clear();
        self.matrix = DistanceMatrix::empty();
    }
}
