//! Optimization client contract tests.
//!
//! Permutation fidelity, short-circuits, and provider-failure mapping, all
//! against in-memory providers.

use std::cell::Cell;

use stop_planner::client::RouteOptimizationClient;
use stop_planner::route::Polyline;
use stop_planner::stop::{Coordinate, ProofOfDelivery, Stop, StopId};
use stop_planner::store::StopStore;
use stop_planner::traits::{DirectPath, DirectionsProvider, OptimizeError, RouteLeg, TripPlan};

// ============================================================================
// Test Fixtures
// ============================================================================

fn stop(id: &str, lat: f64, lng: f64) -> Stop {
    Stop::new(id, format!("Stop {id}"), format!("{id} Main St")).with_geo(lat, lng)
}

fn delivery_stops(n: usize) -> Vec<Stop> {
    (0..n)
        .map(|i| stop(&format!("s{i}"), 36.10 + i as f64 * 0.01, -115.10))
        .collect()
}

const ORIGIN: Coordinate = Coordinate {
    latitude: 36.0,
    longitude: -115.0,
};

/// Provider that visits the submitted waypoints in reverse and reports a
/// fixed cost per leg.
#[derive(Default)]
struct ReversingProvider {
    trip_calls: Cell<usize>,
    route_calls: Cell<usize>,
}

impl DirectionsProvider for ReversingProvider {
    fn optimized_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
        destination: Coordinate,
    ) -> Result<TripPlan, OptimizeError> {
        self.trip_calls.set(self.trip_calls.get() + 1);
        let mut points = vec![origin];
        points.extend(waypoints.iter().rev().copied());
        points.push(destination);
        Ok(TripPlan {
            order: (0..waypoints.len()).rev().collect(),
            legs: vec![
                RouteLeg {
                    distance: 1000.0,
                    duration: 120.0,
                };
                waypoints.len() + 1
            ],
            geometry: Polyline::new(points),
        })
    }

    fn direct_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DirectPath, OptimizeError> {
        self.route_calls.set(self.route_calls.get() + 1);
        Ok(DirectPath {
            leg: RouteLeg {
                distance: 500.0,
                duration: 60.0,
            },
            geometry: Polyline::new(vec![origin, destination]),
        })
    }
}

/// Provider that is never reachable.
struct UnavailableProvider;

impl DirectionsProvider for UnavailableProvider {
    fn optimized_trip(
        &self,
        _origin: Coordinate,
        _waypoints: &[Coordinate],
        _destination: Coordinate,
    ) -> Result<TripPlan, OptimizeError> {
        Err(OptimizeError::ProviderUnavailable(
            "connection refused".to_string(),
        ))
    }

    fn direct_route(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
    ) -> Result<DirectPath, OptimizeError> {
        Err(OptimizeError::ProviderUnavailable(
            "connection refused".to_string(),
        ))
    }
}

/// Provider that duplicates a waypoint in its optimized order.
struct DuplicatingProvider;

impl DirectionsProvider for DuplicatingProvider {
    fn optimized_trip(
        &self,
        _origin: Coordinate,
        waypoints: &[Coordinate],
        _destination: Coordinate,
    ) -> Result<TripPlan, OptimizeError> {
        Ok(TripPlan {
            order: vec![0; waypoints.len()],
            legs: vec![RouteLeg::default(); waypoints.len() + 1],
            geometry: Polyline::empty(),
        })
    }

    fn direct_route(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
    ) -> Result<DirectPath, OptimizeError> {
        Err(OptimizeError::ProviderRejected {
            code: "NoRoute".to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn result_is_permutation_of_submitted_stops() {
    let client = RouteOptimizationClient::new(ReversingProvider::default());
    let stops = delivery_stops(4);

    let result = client.optimize(ORIGIN, &stops).unwrap();

    assert_eq!(result.ordered.len(), 4);
    let mut seen: Vec<_> = result.ordered.iter().map(|id| id.as_str()).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec!["s0", "s1", "s2", "s3"]);

    // Waypoints reversed, destination pinned last.
    let order: Vec<_> = result.ordered.iter().map(|id| id.as_str()).collect();
    assert_eq!(order, vec!["s2", "s1", "s0", "s3"]);
}

#[test]
fn totals_are_summed_over_legs() {
    let client = RouteOptimizationClient::new(ReversingProvider::default());
    let stops = delivery_stops(4);

    let result = client.optimize(ORIGIN, &stops).unwrap();

    // 3 waypoints + destination = 4 legs.
    assert_eq!(result.total_distance, 4000.0);
    assert_eq!(result.total_duration, 480.0);
    assert!(!result.geometry.is_empty());
}

#[test]
fn empty_input_short_circuits_without_provider_call() {
    let provider = ReversingProvider::default();
    let client = RouteOptimizationClient::new(&provider);

    let result = client.optimize(ORIGIN, &[]).unwrap();

    assert!(result.ordered.is_empty());
    assert_eq!(result.total_distance, 0.0);
    assert_eq!(result.total_duration, 0.0);
    assert_eq!(provider.trip_calls.get(), 0);
    assert_eq!(provider.route_calls.get(), 0);
}

#[test]
fn single_stop_skips_waypoint_optimization() {
    let client = RouteOptimizationClient::new(ReversingProvider::default());
    let stops = delivery_stops(1);

    let result = client.optimize(ORIGIN, &stops).unwrap();

    assert_eq!(result.ordered, vec![StopId::new("s0")]);
    assert_eq!(result.total_distance, 500.0);
    assert_eq!(result.total_duration, 60.0);
    assert_eq!(result.geometry.len(), 2);
}

#[test]
fn zero_and_one_stop_never_invoke_trip_optimization() {
    let provider = ReversingProvider::default();
    let client = RouteOptimizationClient::new(&provider);

    client.optimize(ORIGIN, &[]).unwrap();
    client.optimize(ORIGIN, &delivery_stops(1)).unwrap();

    assert_eq!(provider.trip_calls.get(), 0);
    assert_eq!(provider.route_calls.get(), 1);
}

#[test]
fn single_stop_survives_provider_failure() {
    let client = RouteOptimizationClient::new(UnavailableProvider);
    let stops = delivery_stops(1);

    let result = client.optimize(ORIGIN, &stops).unwrap();

    assert_eq!(result.ordered, vec![StopId::new("s0")]);
    assert!(result.geometry.is_empty());
    assert_eq!(result.total_distance, 0.0);
    assert_eq!(result.total_duration, 0.0);
}

#[test]
fn provider_failure_maps_through_unchanged() {
    let client = RouteOptimizationClient::new(UnavailableProvider);
    let stops = delivery_stops(3);

    let result = client.optimize(ORIGIN, &stops);
    assert!(matches!(
        result,
        Err(OptimizeError::ProviderUnavailable(_))
    ));
}

#[test]
fn non_permutation_order_is_rejected_as_malformed() {
    let client = RouteOptimizationClient::new(DuplicatingProvider);
    let stops = delivery_stops(3);

    let result = client.optimize(ORIGIN, &stops);
    assert!(matches!(result, Err(OptimizeError::MalformedResponse(_))));
}

#[test]
fn optimization_leaves_stops_untouched() {
    let client = RouteOptimizationClient::new(ReversingProvider::default());
    let stops = delivery_stops(3);
    let before = stops.clone();

    let _ = client.optimize(ORIGIN, &stops).unwrap();

    assert_eq!(stops, before);
}

#[test]
fn ungeocoded_stop_is_rejected_before_any_provider_call() {
    let provider = ReversingProvider::default();
    let client = RouteOptimizationClient::new(&provider);
    let mut stops = delivery_stops(2);
    stops.push(Stop::new("s2", "Stop s2", "s2 Main St"));

    let result = client.optimize(ORIGIN, &stops);
    assert_eq!(
        result.unwrap_err(),
        OptimizeError::MissingGeocode {
            id: StopId::new("s2")
        }
    );
    assert_eq!(provider.trip_calls.get(), 0);
    assert_eq!(provider.route_calls.get(), 0);
}

#[test]
fn finished_stop_is_rejected() {
    let mut store = StopStore::new();
    store.add_stop(stop("a", 36.1, -115.1)).unwrap();
    store.add_stop(stop("b", 36.2, -115.2)).unwrap();
    store
        .mark_done(&StopId::new("a"), ProofOfDelivery::now())
        .unwrap();

    let client = RouteOptimizationClient::new(ReversingProvider::default());
    let all: Vec<Stop> = store.stops().to_vec();

    let result = client.optimize(ORIGIN, &all);
    assert_eq!(
        result.unwrap_err(),
        OptimizeError::NotPending {
            id: StopId::new("a")
        }
    );
}
