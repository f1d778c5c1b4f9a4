//! trip-planner: multi-stop route planning pipeline
//!
//! Collects validated addresses, asks a solver for candidate vehicle routes,
//! and summarizes a chosen route through a mapping provider.

pub mod error;
pub mod model;
pub mod traits;
pub mod config;
pub mod backend;
pub mod maps;
pub mod registry;
pub mod candidates;
pub mod summary;
pub mod session;
pub mod matrix;
pub mod haversine;
pub mod solver;

pub use error::PlannerError;
pub use model::{Address, DistanceMatrix, Route, RouteCandidates, TripStops};
pub use session::{MapView, PlanningSession, Screen};
pub use summary::{TripSummarizer, TripSummary};
