//! Error taxonomy for the trip planning pipeline.

use thiserror::Error;

/// Errors raised by the planning pipeline and its external collaborators.
///
/// Every failure aborts only the operation that raised it; session state is
/// never touched before all external calls of an operation have succeeded.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The validation endpoint rejected the address.
    #[error("address could not be validated: {0}")]
    ValidationFailed(String),

    /// The distance matrix rebuild was rejected or came back inconsistent.
    #[error("distance matrix update failed: {0}")]
    UpdateFailed(String),

    /// The route solver rejected the matrix.
    #[error("route computation failed: {0}")]
    SolverFailed(String),

    /// The mapping provider answered a routing request with a non-OK status.
    #[error("routing request failed with status {status}: {message}")]
    ProviderRoutingFailed { status: String, message: String },

    /// The mapping provider answered a distance-matrix request with a non-OK status.
    #[error("distance matrix request failed with status {status}: {message}")]
    ProviderMatrixFailed { status: String, message: String },

    #[error("route {index} does not exist ({count} candidates)")]
    UnknownRoute { index: usize, count: usize },

    #[error("route references stop {index} but only {count} addresses are known")]
    InvalidStop { index: usize, count: usize },

    #[error("no route has been selected")]
    NoRouteSelected,

    #[error("a trip summary can only be computed on the map screen")]
    NotOnMapScreen,

    #[error("routes can only be computed on the address-entry screen")]
    NotOnAddressEntryScreen,

    #[error("invalid distance matrix: {0}")]
    InvalidMatrix(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    pub(crate) fn routing(status: impl Into<String>, message: impl Into<String>) -> Self {
        PlannerError::ProviderRoutingFailed {
            status: status.into(),
            message: message.into(),
        }
    }

    pub(crate) fn matrix(status: impl Into<String>, message: impl Into<String>) -> Self {
        PlannerError::ProviderMatrixFailed {
            status: status.into(),
            message: message.into(),
        }
    }
}
