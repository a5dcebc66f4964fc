//! Stop-level optimization over a directions provider.
//!
//! Turns a driver position plus the pending stops into a canonical
//! [`RouteResult`] by delegating the visiting-order computation to the
//! provider and normalizing its answer. Does not touch the store and has no
//! side effects beyond the provider call.

use tracing::{debug, warn};

use crate::route::{Polyline, RouteResult};
use crate::stop::{Coordinate, Stop, StopId};
use crate::traits::{DirectionsProvider, OptimizeError, RouteLeg};

/// Boundary adapter in front of the external optimization service.
#[derive(Debug, Clone)]
pub struct RouteOptimizationClient<P> {
    provider: P,
}

impl<P: DirectionsProvider> RouteOptimizationClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Compute a visiting order for `stops` starting from `origin`.
    ///
    /// Every submitted stop must be pending and geocoded. Zero stops yield
    /// the trivial empty result and a single stop is returned directly;
    /// neither consults the provider's waypoint optimization.
    pub fn optimize(
        &self,
        origin: Coordinate,
        stops: &[Stop],
    ) -> Result<RouteResult, OptimizeError> {
        let coords = routing_coords(stops)?;

        match stops.len() {
            0 => Ok(RouteResult::empty()),
            1 => Ok(self.single_stop(origin, &stops[0], coords[0])),
            _ => self.multi_stop(origin, stops, &coords),
        }
    }

    /// One stop is both sole waypoint and destination; there is no order to
    /// optimize. Geometry is an enhancement here, so a provider failure must
    /// not turn the plan into an error.
    fn single_stop(&self, origin: Coordinate, stop: &Stop, destination: Coordinate) -> RouteResult {
        let (leg, geometry) = match self.provider.direct_route(origin, destination) {
            Ok(path) => (path.leg, path.geometry),
            Err(err) => {
                warn!(error = %err, "direct route unavailable, returning bare order");
                (RouteLeg::default(), Polyline::empty())
            }
        };

        RouteResult {
            ordered: vec![stop.id.clone()],
            geometry,
            total_distance: leg.distance,
            total_duration: leg.duration,
        }
    }

    fn multi_stop(
        &self,
        origin: Coordinate,
        stops: &[Stop],
        coords: &[Coordinate],
    ) -> Result<RouteResult, OptimizeError> {
        let last = stops.len() - 1;
        let plan = self
            .provider
            .optimized_trip(origin, &coords[..last], coords[last])?;

        validate_permutation(&plan.order, last)?;
        let mut ordered: Vec<StopId> = plan.order.iter().map(|&i| stops[i].id.clone()).collect();
        ordered.push(stops[last].id.clone());

        let total_distance = plan.legs.iter().map(|leg| leg.distance).sum();
        let total_duration = plan.legs.iter().map(|leg| leg.duration).sum();
        debug!(
            stops = ordered.len(),
            total_distance, total_duration, "optimized route"
        );

        Ok(RouteResult {
            ordered,
            geometry: plan.geometry,
            total_distance,
            total_duration,
        })
    }
}

/// Precondition check: pending, geocoded, in submission order.
fn routing_coords(stops: &[Stop]) -> Result<Vec<Coordinate>, OptimizeError> {
    stops
        .iter()
        .map(|stop| {
            if !stop.is_pending() {
                return Err(OptimizeError::NotPending {
                    id: stop.id.clone(),
                });
            }
            stop.geo.ok_or_else(|| OptimizeError::MissingGeocode {
                id: stop.id.clone(),
            })
        })
        .collect()
}

/// The provider's order must be exactly a permutation of the submitted
/// waypoints; anything else would add, drop, or duplicate a stop.
fn validate_permutation(order: &[usize], len: usize) -> Result<(), OptimizeError> {
    if order.len() != len {
        return Err(OptimizeError::MalformedResponse(format!(
            "expected {len} waypoints in optimized order, got {}",
            order.len()
        )));
    }
    let mut seen = vec![false; len];
    for &index in order {
        if index >= len || seen[index] {
            return Err(OptimizeError::MalformedResponse(
                "optimized order is not a permutation of the submitted stops".to_string(),
            ));
        }
        seen[index] = true;
    }
    Ok(())
}
