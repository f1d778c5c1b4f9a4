//! A single planning session and its two-screen state machine.
//!
//! The session starts on the address-entry screen. Choosing a route and
//! proceeding moves it to the map screen, carrying the route's stops; that
//! is the only transition. Selecting a different route while on the map
//! replaces the stops and discards any summary so it is computed again.

use tracing::info;

use crate::candidates;
use crate::config::SummaryOptions;
use crate::error::PlannerError;
use crate::model::{Address, DistanceMatrix, RouteCandidates, TripStops};
use crate::registry::AddressRegistry;
use crate::summary::{TripSummarizer, TripSummary};
use crate::traits::{AddressValidator, DirectionsProvider, DistanceMatrixProvider, MatrixUpdater, RouteSolver};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Screen {
    #[default]
    AddressEntry,
    Map(MapView),
}

/// State of the map screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub route_index: usize,
    pub stops: TripStops,
    /// Unset until the provider has answered every summary request.
    pub summary: Option<TripSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct PlanningSession {
    registry: AddressRegistry,
    candidates: RouteCandidates,
    selected: Option<(usize, TripStops)>,
    screen: Screen,
}

impl PlanningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> &[Address] {
        self.registry.addresses()
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        self.registry.matrix()
    }

    pub fn candidates(&self) -> &RouteCandidates {
        &self.candidates
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Index and stops of the selected route, if any.
    pub fn selected(&self) -> Option<(usize, &TripStops)> {
        self.selected.as_ref().map(|(index, stops)| (*index, stops))
    }

    pub fn summary(&self) -> Option<&TripSummary> {
        match &self.screen {
            Screen::Map(view) => view.summary.as_ref(),
            Screen::AddressEntry => None,
        }
    }

    pub fn add_address<V, U>(&mut self, raw: &str, validator: &V, updater: &U) -> Result<&Address, PlannerError>
    where
        V: AddressValidator + ?Sized,
        U: MatrixUpdater + ?Sized,
    {
        self.registry.add_address(raw, validator, updater)
    }

    /// Replace the candidate routes. Any selection is cleared.
    ///
    /// Only allowed on the address-entry screen: the map screen's stops and
    /// summary are tied to an index into the current candidates.
    pub fn compute_routes<S>(&mut self, solver: &S) -> Result<&RouteCandidates, PlannerError>
    where
        S: RouteSolver + ?Sized,
    {
        if matches!(self.screen, Screen::Map(_)) {
            return Err(PlannerError::NotOnAddressEntryScreen);
        }

        let computed = candidates::compute_routes(self.registry.matrix(), solver)?;
        self.candidates = computed;
        self.selected = None;
        Ok(&self.candidates)
    }

    /// Mark candidate `index` as the selected route.
    ///
    /// On the map screen this restarts the summary for the new stops.
    pub fn select_route(&mut self, index: usize) -> Result<&TripStops, PlannerError> {
        let stops = candidates::select_route(&self.candidates, index, self.registry.addresses())?;
        info!(route = index, origin = %stops.origin, destination = %stops.destination, "route selected");

        if let Screen::Map(view) = &mut self.screen {
            view.route_index = index;
            view.stops = stops.clone();
            view.summary = None;
        }

        let (_, stops) = &*self.selected.insert((index, stops));
        Ok(stops)
    }

    /// Move to the map screen with the selected route's stops.
    pub fn proceed(&mut self) -> Result<&MapView, PlannerError> {
        let (index, stops) = self.selected.clone().ok_or(PlannerError::NoRouteSelected)?;

        if matches!(self.screen, Screen::AddressEntry) {
            info!(route = index, "entering map screen");
            self.screen = Screen::Map(MapView {
                route_index: index,
                stops,
                summary: None,
            });
        }

        match &self.screen {
            Screen::Map(view) => Ok(view),
            Screen::AddressEntry => Err(PlannerError::NotOnMapScreen),
        }
    }

    /// Compute the trip summary for the map screen's stops.
    ///
    /// On failure the summary stays unset and the session is unchanged.
    pub fn summarize<P>(&mut self, provider: &P, options: SummaryOptions) -> Result<&TripSummary, PlannerError>
    where
        P: DirectionsProvider + DistanceMatrixProvider + ?Sized,
    {
        let Screen::Map(view) = &mut self.screen else {
            return Err(PlannerError::NotOnMapScreen);
        };

        let summary = TripSummarizer::new(provider, options).summarize(&view.stops)?;
        Ok(&*view.summary.insert(summary))
    }

    /// Discard every address, route and screen state.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.candidates = RouteCandidates::default();
        self.selected = None;
        self.screen = Screen::AddressEntry;
    }
}
