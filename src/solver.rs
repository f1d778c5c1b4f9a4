//! Local route solver (in-process alternative to the backend's `/calculate_routes`).
//!
//! Every vehicle leaves from and returns to the depot. The objective is the
//! total distance plus a span cost on the longest route, which spreads stops
//! across vehicles instead of loading them onto one.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::PlannerError;
use crate::model::{DistanceMatrix, Route, RouteCandidates};
use crate::traits::RouteSolver;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub num_vehicles: usize,
    /// Index of the start/end address for every vehicle.
    pub depot: usize,
    /// Maximum distance any single vehicle may travel.
    pub max_route_distance: f64,
    /// Weight of the longest route in the objective.
    pub span_cost_coefficient: f64,
    /// Maximum iterations for local search improvement.
    pub local_search_iterations: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            num_vehicles: 4,
            depot: 0,
            max_route_distance: 3000.0,
            span_cost_coefficient: 100.0,
            local_search_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalSolver {
    pub options: SolveOptions,
}

impl LocalSolver {
    pub fn new(options: SolveOptions) -> Self {
        Self { options }
    }

    pub fn solve(&self, matrix: &DistanceMatrix) -> Result<RouteCandidates, PlannerError> {
        let options = &self.options;
        check_inputs(matrix, options)?;

        let rows = matrix.rows();
        let depot = options.depot;
        let mut routes: Vec<Vec<usize>> = vec![Vec::new(); options.num_vehicles];
        let mut distances = vec![0.0; options.num_vehicles];

        for stop in (0..matrix.size()).filter(|&stop| stop != depot) {
            let best = (0..options.num_vehicles)
                .into_par_iter()
                .filter_map(|vehicle| {
                    best_insertion(rows, depot, &routes[vehicle], stop, options.max_route_distance).map(
                        |(position, distance)| {
                            let mut trial = distances.clone();
                            trial[vehicle] = distance;
                            (objective(&trial, options), vehicle, position, distance)
                        },
                    )
                })
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let Some((_, vehicle, position, distance)) = best else {
                return Err(PlannerError::SolverFailed(format!(
                    "stop {} cannot be served within a route distance of {}",
                    stop, options.max_route_distance
                )));
            };
            routes[vehicle].insert(position, stop);
            distances[vehicle] = distance;
        }

        local_search(rows, &mut routes, &mut distances, options);

        let routes: Vec<Route> = routes
            .into_iter()
            .zip(distances)
            .map(|(visits, distance)| {
                let mut stops = Vec::with_capacity(visits.len() + 2);
                stops.push(depot);
                stops.extend(visits);
                stops.push(depot);
                Route { stops, distance }
            })
            .collect();
        let total_distance = routes.iter().map(|route| route.distance).sum();

        info!(vehicles = routes.len(), total_distance, "local solve finished");
        Ok(RouteCandidates { routes, total_distance })
    }
}

impl RouteSolver for LocalSolver {
    fn compute_routes(&self, matrix: &DistanceMatrix) -> Result<RouteCandidates, PlannerError> {
        self.solve(matrix)
    }
}

fn check_inputs(matrix: &DistanceMatrix, options: &SolveOptions) -> Result<(), PlannerError> {
    if matrix.is_empty() {
        return Err(PlannerError::SolverFailed("distance matrix is empty".to_string()));
    }
    if options.num_vehicles == 0 {
        return Err(PlannerError::SolverFailed("no vehicles available".to_string()));
    }
    if options.depot >= matrix.size() {
        return Err(PlannerError::SolverFailed(format!(
            "depot {} is outside a {}x{} matrix",
            options.depot,
            matrix.size(),
            matrix.size()
        )));
    }
    if matrix.rows().iter().flatten().any(|d| !d.is_finite() || *d < 0.0) {
        return Err(PlannerError::SolverFailed(
            "distance matrix contains negative or non-finite entries".to_string(),
        ));
    }
    Ok(())
}

fn route_distance(rows: &[Vec<f64>], depot: usize, visits: &[usize]) -> f64 {
    let Some(&last) = visits.last() else {
        return 0.0;
    };
    let mut previous = depot;
    let mut total = 0.0;
    for &stop in visits {
        total += rows[previous][stop];
        previous = stop;
    }
    total + rows[last][depot]
}

fn objective(distances: &[f64], options: &SolveOptions) -> f64 {
    let total: f64 = distances.iter().sum();
    let longest = distances.iter().copied().fold(0.0, f64::max);
    total + options.span_cost_coefficient * longest
}

/// Cheapest feasible position for `stop` in `visits`, with the resulting distance.
fn best_insertion(
    rows: &[Vec<f64>],
    depot: usize,
    visits: &[usize],
    stop: usize,
    max_distance: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for position in 0..=visits.len() {
        let mut candidate = visits.to_vec();
        candidate.insert(position, stop);
        let distance = route_distance(rows, depot, &candidate);
        if distance > max_distance {
            continue;
        }
        if best.is_none_or(|(_, current)| distance < current - EPSILON) {
            best = Some((position, distance));
        }
    }
    best
}

// ============================================================================
// Local Search Operators
// ============================================================================

/// 2-opt: Reverse a segment within a route to shorten it.
/// Returns true if an improvement was made.
fn two_opt_improve(rows: &[Vec<f64>], depot: usize, visits: &mut [usize], distance: &mut f64) -> bool {
    let n = visits.len();
    if n < 2 {
        return false;
    }

    for i in 0..n - 1 {
        for j in i + 1..n {
            visits[i..=j].reverse();
            let candidate = route_distance(rows, depot, visits);
            if candidate < *distance - EPSILON {
                *distance = candidate;
                return true;
            }
            visits[i..=j].reverse();
        }
    }

    false
}

/// Relocate: Move a stop from one route to another.
/// Returns true if an improvement was made.
fn relocate_improve(
    rows: &[Vec<f64>],
    routes: &mut [Vec<usize>],
    distances: &mut [f64],
    options: &SolveOptions,
) -> bool {
    let current = objective(distances, options);

    for from in 0..routes.len() {
        for index in 0..routes[from].len() {
            let mut from_candidate = routes[from].clone();
            let stop = from_candidate.remove(index);
            let from_distance = route_distance(rows, options.depot, &from_candidate);

            for to in 0..routes.len() {
                if to == from {
                    continue;
                }
                for position in 0..=routes[to].len() {
                    let mut to_candidate = routes[to].clone();
                    to_candidate.insert(position, stop);
                    let to_distance = route_distance(rows, options.depot, &to_candidate);
                    if to_distance > options.max_route_distance {
                        continue;
                    }

                    let mut trial = distances.to_vec();
                    trial[from] = from_distance;
                    trial[to] = to_distance;
                    if objective(&trial, options) < current - EPSILON {
                        routes[from] = from_candidate;
                        routes[to] = to_candidate;
                        distances[from] = from_distance;
                        distances[to] = to_distance;
                        return true;
                    }
                }
            }
        }
    }

    false
}

/// Run local search improvement until no more improvements or max iterations reached.
fn local_search(rows: &[Vec<f64>], routes: &mut [Vec<usize>], distances: &mut [f64], options: &SolveOptions) {
    for iteration in 0..options.local_search_iterations {
        let mut improved = false;

        for (visits, distance) in routes.iter_mut().zip(distances.iter_mut()) {
            if two_opt_improve(rows, options.depot, visits, distance) {
                improved = true;
            }
        }

        if relocate_improve(rows, routes, distances, options) {
            improved = true;
        }

        if !improved {
            debug!(iteration, "local search converged");
            break;
        }
    }
}
