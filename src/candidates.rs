//! Route candidate generation and selection.

use tracing::{info, warn};

use crate::error::PlannerError;
use crate::model::{Address, DistanceMatrix, RouteCandidates, TripStops};
use crate::traits::RouteSolver;

/// Ask `solver` for routes over `matrix` and check the answer against it.
///
/// Every route must be non-empty and reference only rows of the matrix.
pub fn compute_routes<S>(matrix: &DistanceMatrix, solver: &S) -> Result<RouteCandidates, PlannerError>
where
    S: RouteSolver + ?Sized,
{
    let candidates = solver.compute_routes(matrix).inspect_err(|err| {
        warn!(error = %err, "route computation failed");
    })?;

    let size = matrix.size();
    for (index, route) in candidates.routes.iter().enumerate() {
        if route.stops.is_empty() {
            return Err(PlannerError::SolverFailed(format!("route {} is empty", index)));
        }
        if let Some(stop) = route.stops.iter().find(|&&stop| stop >= size) {
            return Err(PlannerError::SolverFailed(format!(
                "route {} visits stop {} outside a {}x{} matrix",
                index, stop, size, size
            )));
        }
    }

    info!(
        routes = candidates.len(),
        total_distance = candidates.total_distance,
        "routes computed"
    );
    Ok(candidates)
}

/// Project candidate `index` onto address text.
pub fn select_route(
    candidates: &RouteCandidates,
    index: usize,
    addresses: &[Address],
) -> Result<TripStops, PlannerError> {
    let route = candidates.get(index)?;
    TripStops::from_route(route, addresses)
}
