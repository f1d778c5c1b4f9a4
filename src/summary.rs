//! Trip summaries for a selected route.
//!
//! A summary is built from three provider calls issued strictly in order:
//! the optimized directions, distances from the origin to every other stop,
//! and the full pairwise table over the optimized stops. A failure at any
//! step abandons the summary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SummaryOptions;
use crate::error::PlannerError;
use crate::model::{Address, Route, TripStops};
use crate::traits::{DepartureTime, DirectionsProvider, DirectionsRequest, DistanceMatrixProvider};

/// File name of the downloadable summary artifact.
pub const ROUTE_INFO_FILE: &str = "route_info.json";

const SHARE_LINK_BASE: &str = "https://www.google.com/maps/dir/?api=1";

/// Read-only projection of a route after provider optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    /// Total driving time, e.g. `"25 min"`.
    pub time: String,
    /// Per-leg distances and their total, e.g. `"1.00 km -> 2.50 km = 3.50 km"`.
    pub distance: String,
    pub total_minutes: u64,
    pub total_distance_km: f64,
    pub origin_distances: Vec<StopDistance>,
    pub distance_matrix: Vec<Vec<MatrixCell>>,
    /// Origin, optimized waypoints, destination.
    pub optimized_stops: Vec<String>,
    pub leg_distances: Vec<f64>,
    pub reference_list: Vec<ReferenceEntry>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDistance {
    pub stop: String,
    #[serde(rename = "distance", with = "km_text")]
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub from: String,
    pub to: String,
    #[serde(rename = "distance", with = "km_text")]
    pub distance_km: f64,
}

/// One row of the reference list: a stop with its leg and running distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub name: String,
    pub address: String,
    pub distance_km: f64,
    pub cumulative_km: f64,
}

impl TripSummary {
    /// Optimized waypoints, without origin and destination.
    pub fn waypoints(&self) -> &[String] {
        match self.optimized_stops.len() {
            0..=2 => &[],
            n => &self.optimized_stops[1..n - 1],
        }
    }

    pub fn leg_labels(&self) -> Vec<String> {
        self.leg_distances.iter().map(|km| format_km(*km)).collect()
    }

    pub fn total_distance_label(&self) -> String {
        format_km(self.total_distance_km)
    }

    pub fn to_json_pretty(&self) -> Result<String, PlannerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the summary to `dir/route_info.json` and return the path.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf, PlannerError> {
        let path = dir.join(ROUTE_INFO_FILE);
        fs::write(&path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "route info written");
        Ok(path)
    }
}

/// Builds [`TripSummary`] values through a mapping provider.
pub struct TripSummarizer<'a, P: ?Sized> {
    provider: &'a P,
    options: SummaryOptions,
}

impl<'a, P> TripSummarizer<'a, P>
where
    P: DirectionsProvider + DistanceMatrixProvider + ?Sized,
{
    pub fn new(provider: &'a P, options: SummaryOptions) -> Self {
        Self { provider, options }
    }

    pub fn summarize_route(&self, route: &Route, addresses: &[Address]) -> Result<TripSummary, PlannerError> {
        let stops = TripStops::from_route(route, addresses)?;
        self.summarize(&stops)
    }

    pub fn summarize(&self, stops: &TripStops) -> Result<TripSummary, PlannerError> {
        let request = DirectionsRequest {
            origin: stops.origin.clone(),
            destination: stops.destination.clone(),
            waypoints: stops.waypoints.clone(),
            optimize_waypoints: true,
            provide_alternatives: true,
            travel_mode: self.options.travel_mode,
            units: self.options.units,
            traffic_model: self.options.traffic_model,
            departure: DepartureTime::Now,
        };

        debug!(origin = %stops.origin, destination = %stops.destination, waypoints = stops.waypoints.len(), "requesting directions");
        let route = self.provider.directions(&request).inspect_err(|err| {
            warn!(error = %err, "directions failed, no summary");
        })?;

        if route.legs.len() != stops.waypoints.len() + 1 {
            return Err(PlannerError::routing(
                "OK",
                format!(
                    "expected {} legs for {} waypoints, got {}",
                    stops.waypoints.len() + 1,
                    stops.waypoints.len(),
                    route.legs.len()
                ),
            ));
        }
        if !is_permutation(&route.waypoint_order, stops.waypoints.len()) {
            return Err(PlannerError::routing(
                "OK",
                format!("waypoint order {:?} is not a permutation", route.waypoint_order),
            ));
        }

        let ordered_waypoints: Vec<String> = route
            .waypoint_order
            .iter()
            .map(|&i| stops.waypoints[i].clone())
            .collect();

        let total_seconds: u64 = route.legs.iter().map(|leg| leg.duration_secs).sum();
        let total_minutes = total_seconds.div_ceil(60);
        let leg_distances: Vec<f64> = route.legs.iter().map(|leg| meters_to_km(leg.distance_meters)).collect();
        let total_distance_km = round_2(leg_distances.iter().sum());

        let origin_distances = self.origin_distances(stops)?;

        let mut optimized_stops = Vec::with_capacity(ordered_waypoints.len() + 2);
        optimized_stops.push(stops.origin.clone());
        optimized_stops.extend(ordered_waypoints.iter().cloned());
        optimized_stops.push(stops.destination.clone());

        let distance_matrix = self.pairwise_distances(&optimized_stops)?;

        let leg_labels: Vec<String> = leg_distances.iter().map(|km| format_km(*km)).collect();
        let summary = TripSummary {
            time: format!("{} min", total_minutes),
            distance: format!("{} = {}", leg_labels.join(" -> "), format_km(total_distance_km)),
            total_minutes,
            total_distance_km,
            origin_distances,
            distance_matrix,
            reference_list: reference_list(&optimized_stops, &leg_distances),
            link: share_link(&stops.origin, &stops.destination, &ordered_waypoints),
            optimized_stops,
            leg_distances,
        };

        info!(time = %summary.time, distance = %summary.distance, "trip summary ready");
        Ok(summary)
    }

    fn origin_distances(&self, stops: &TripStops) -> Result<Vec<StopDistance>, PlannerError> {
        let mut targets = Vec::with_capacity(stops.waypoints.len() + 1);
        targets.push(stops.destination.clone());
        targets.extend(stops.waypoints.iter().cloned());

        let rows = self
            .provider
            .distance_matrix(
                std::slice::from_ref(&stops.origin),
                &targets,
                self.options.travel_mode,
                self.options.units,
            )
            .inspect_err(|err| warn!(error = %err, "origin distance query failed, no summary"))?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::matrix("OK", "no row for the origin"))?;
        if row.len() != targets.len() {
            return Err(PlannerError::matrix(
                "OK",
                format!("expected {} distances from the origin, got {}", targets.len(), row.len()),
            ));
        }

        targets
            .into_iter()
            .zip(row)
            .map(|(stop, meters)| -> Result<StopDistance, PlannerError> {
                let meters = meters.ok_or_else(|| unreachable_pair(&stops.origin, &stop))?;
                Ok(StopDistance {
                    stop,
                    distance_km: meters_to_km(meters),
                })
            })
            .collect()
    }

    fn pairwise_distances(&self, stops: &[String]) -> Result<Vec<Vec<MatrixCell>>, PlannerError> {
        let rows = self
            .provider
            .distance_matrix(stops, stops, self.options.travel_mode, self.options.units)
            .inspect_err(|err| warn!(error = %err, "pairwise distance query failed, no summary"))?;

        if rows.len() != stops.len() || rows.iter().any(|row| row.len() != stops.len()) {
            return Err(PlannerError::matrix(
                "OK",
                format!("expected a {}x{} table", stops.len(), stops.len()),
            ));
        }

        rows.into_iter()
            .zip(stops)
            .map(|(row, from)| {
                row.into_iter()
                    .zip(stops)
                    .map(|(meters, to)| -> Result<MatrixCell, PlannerError> {
                        let meters = meters.ok_or_else(|| unreachable_pair(from, to))?;
                        Ok(MatrixCell {
                            from: from.clone(),
                            to: to.clone(),
                            distance_km: meters_to_km(meters),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

/// Reference label of stop `index` among `count` stops.
pub fn stop_name(index: usize, count: usize) -> String {
    if index == 0 {
        "start".to_string()
    } else if index + 1 == count {
        "destination".to_string()
    } else {
        format!("stop{}", index)
    }
}

/// Label each stop and accumulate leg distances left to right.
///
/// `legs[i]` is the distance from `stops[i]` to `stops[i + 1]`.
pub fn reference_list(stops: &[String], legs: &[f64]) -> Vec<ReferenceEntry> {
    let mut cumulative = 0.0;
    stops
        .iter()
        .enumerate()
        .map(|(index, stop)| {
            let distance_km = if index == 0 {
                0.0
            } else {
                legs.get(index - 1).copied().unwrap_or(0.0)
            };
            cumulative += distance_km;
            ReferenceEntry {
                name: stop_name(index, stops.len()),
                address: stop.clone(),
                distance_km,
                cumulative_km: round_2(cumulative),
            }
        })
        .collect()
}

/// Directions deep link for origin, destination and ordered waypoints.
pub fn share_link(origin: &str, destination: &str, waypoints: &[String]) -> String {
    format!(
        "{}&origin={}&destination={}&waypoints={}",
        SHARE_LINK_BASE,
        urlencoding::encode(origin),
        urlencoding::encode(destination),
        urlencoding::encode(&waypoints.join("|"))
    )
}

/// Meters to kilometers, rounded to two decimals.
pub fn meters_to_km(meters: u64) -> f64 {
    (meters as f64 / 10.0).round() / 100.0
}

pub fn format_km(km: f64) -> String {
    format!("{:.2} km", km)
}

/// Kilometers as two-decimal text (`"1.00"`) in `route_info.json` cells.
mod km_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(km: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&format_args!("{:.2}", km))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .trim()
            .parse()
            .map_err(<D::Error as serde::de::Error>::custom)
    }
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in order {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

fn unreachable_pair(from: &str, to: &str) -> PlannerError {
    PlannerError::matrix("OK", format!("no distance from {:?} to {:?}", from, to))
}
