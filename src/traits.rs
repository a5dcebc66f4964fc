//! Directions-provider boundary.
//!
//! The external mapping service sits behind [`DirectionsProvider`], a narrow
//! trait returning typed results. Raw response shapes are parsed into these
//! types at the boundary so internal code never inspects loosely-typed
//! fields. Implemented by the OSRM adapter and by in-memory mocks in tests.

use thiserror::Error;

use crate::route::Polyline;
use crate::stop::{Coordinate, StopId};

/// Distance/duration for one leg of a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteLeg {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

/// Provider answer to a waypoint-optimization request.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    /// Optimized visiting order as indices into the submitted waypoints.
    pub order: Vec<usize>,
    /// Legs connecting origin, waypoints, and destination in visit order.
    pub legs: Vec<RouteLeg>,
    /// Decoded overview geometry.
    pub geometry: Polyline,
}

/// Provider answer to a two-point route request.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectPath {
    pub leg: RouteLeg,
    pub geometry: Polyline,
}

/// Failure classes at the provider boundary.
///
/// Optimization is a best-effort enhancement over the delivery workflow;
/// callers treat every variant as "keep the previous route and carry on".
#[derive(Debug, Error, PartialEq)]
pub enum OptimizeError {
    /// Network/transport failure reaching the provider.
    #[error("routing provider unreachable: {0}")]
    ProviderUnavailable(String),

    /// Provider reachable but refused the request: no feasible route,
    /// invalid waypoints, auth or quota failure.
    #[error("routing provider rejected the request: {code}")]
    ProviderRejected { code: String },

    /// Response missing or contradicting expected fields.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// A submitted stop had no geocode.
    #[error("stop {id} has no geocoded location")]
    MissingGeocode { id: StopId },

    /// A submitted stop was not pending.
    #[error("stop {id} is not pending")]
    NotPending { id: StopId },
}

/// External directions/optimization service.
pub trait DirectionsProvider {
    /// Reorder `waypoints` for minimum travel time on the way from `origin`
    /// to `destination`, driving, departing now.
    fn optimized_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
        destination: Coordinate,
    ) -> Result<TripPlan, OptimizeError>;

    /// Route directly from `origin` to `destination`.
    fn direct_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DirectPath, OptimizeError>;
}

impl<'a, P: DirectionsProvider + ?Sized> DirectionsProvider for &'a P {
    fn optimized_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
        destination: Coordinate,
    ) -> Result<TripPlan, OptimizeError> {
        (**self).optimized_trip(origin, waypoints, destination)
    }

    fn direct_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DirectPath, OptimizeError> {
        (**self).direct_route(origin, destination)
    }
}
