//! OSRM HTTP adapter for trip optimization and direct routes.
//!
//! Uses OSRM's `trip` service with a fixed start and end to reorder the
//! intermediate waypoints for minimum travel time, and the `route` service
//! for plain two-point geometry. Travel mode comes from the configured
//! profile; OSRM carries no live-traffic model, so traffic-aware departure
//! is best-effort by contract.

use serde::Deserialize;
use tracing::debug;

use crate::route::Polyline;
use crate::stop::Coordinate;
use crate::traits::{DirectPath, DirectionsProvider, OptimizeError, RouteLeg, TripPlan};

/// Precision of OSRM's `geometries=polyline` encoding.
const POLYLINE_PRECISION: u32 = 5;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

/// OSRM-backed [`DirectionsProvider`].
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmRouter {
    pub fn new(config: OsrmConfig) -> Result<Self, OptimizeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| OptimizeError::ProviderUnavailable(err.to_string()))?;

        Ok(Self { config, client })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, OptimizeError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| OptimizeError::ProviderUnavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| OptimizeError::ProviderUnavailable(err.to_string()))?;

        if !status.is_success() {
            // OSRM reports the failure class in the body, e.g. {"code": "NoRoute"}.
            let code = serde_json::from_str::<OsrmErrorBody>(&body)
                .map(|err| err.code)
                .unwrap_or_else(|_| status.to_string());
            return Err(OptimizeError::ProviderRejected { code });
        }

        serde_json::from_str(&body).map_err(|err| OptimizeError::MalformedResponse(err.to_string()))
    }
}

impl DirectionsProvider for OsrmRouter {
    fn optimized_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
        destination: Coordinate,
    ) -> Result<TripPlan, OptimizeError> {
        let mut coords = Vec::with_capacity(waypoints.len() + 2);
        coords.push(origin);
        coords.extend_from_slice(waypoints);
        coords.push(destination);

        let url = format!(
            "{}/trip/v1/{}/{}?roundtrip=false&source=first&destination=last&overview=full&geometries=polyline&steps=false",
            self.config.base_url,
            self.config.profile,
            format_coords(&coords)
        );

        debug!(waypoints = waypoints.len(), "requesting optimized trip");
        let response: OsrmTripResponse = self.get_json(&url)?;
        if response.code != "Ok" {
            return Err(OptimizeError::ProviderRejected {
                code: response.code,
            });
        }

        trip_plan_from_response(response, waypoints.len())
    }

    fn direct_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DirectPath, OptimizeError> {
        let url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline&steps=false",
            self.config.base_url,
            self.config.profile,
            format_coords(&[origin, destination])
        );

        let response: OsrmRouteResponse = self.get_json(&url)?;
        if response.code != "Ok" {
            return Err(OptimizeError::ProviderRejected {
                code: response.code,
            });
        }

        let route = response.routes.into_iter().next().ok_or_else(|| {
            OptimizeError::MalformedResponse("response contained no routes".to_string())
        })?;

        Ok(DirectPath {
            leg: RouteLeg {
                distance: route.distance,
                duration: route.duration,
            },
            geometry: decode_geometry(&route.geometry)?,
        })
    }
}

/// OSRM expects `lng,lat` pairs.
fn format_coords(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(|coord| format!("{:.6},{:.6}", coord.longitude, coord.latitude))
        .collect::<Vec<_>>()
        .join(";")
}

fn decode_geometry(encoded: &str) -> Result<Polyline, OptimizeError> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
        .map_err(|err| OptimizeError::MalformedResponse(format!("polyline decode: {err}")))?;

    Ok(Polyline::new(
        line.coords()
            .map(|coord| Coordinate::new(coord.y, coord.x))
            .collect(),
    ))
}

/// Invert the per-waypoint visit positions into the intermediate-waypoint
/// permutation the planning core works with.
fn trip_plan_from_response(
    response: OsrmTripResponse,
    waypoint_count: usize,
) -> Result<TripPlan, OptimizeError> {
    let trip = response.trips.into_iter().next().ok_or_else(|| {
        OptimizeError::MalformedResponse("response contained no trips".to_string())
    })?;

    // Origin and destination travel with the waypoints in the request.
    let expected = waypoint_count + 2;
    if response.waypoints.len() != expected {
        return Err(OptimizeError::MalformedResponse(format!(
            "expected {expected} waypoints, got {}",
            response.waypoints.len()
        )));
    }

    // waypoints[i].waypoint_index is input i's position in the optimized
    // visit order; the origin is pinned to 0 and the destination to the end.
    let mut order = vec![usize::MAX; waypoint_count];
    for (input_index, waypoint) in response
        .waypoints
        .iter()
        .enumerate()
        .skip(1)
        .take(waypoint_count)
    {
        let position = waypoint.waypoint_index;
        if position == 0 || position > waypoint_count {
            return Err(OptimizeError::MalformedResponse(format!(
                "intermediate waypoint visited at position {position}"
            )));
        }
        order[position - 1] = input_index - 1;
    }
    if order.contains(&usize::MAX) {
        return Err(OptimizeError::MalformedResponse(
            "waypoint order is not a permutation".to_string(),
        ));
    }

    let legs = trip
        .legs
        .iter()
        .map(|leg| RouteLeg {
            distance: leg.distance,
            duration: leg.duration,
        })
        .collect();

    Ok(TripPlan {
        order,
        legs,
        geometry: decode_geometry(&trip.geometry)?,
    })
}

#[derive(Debug, Deserialize)]
struct OsrmErrorBody {
    code: String,
}

#[derive(Debug, Deserialize)]
struct OsrmTripResponse {
    code: String,
    #[serde(default)]
    waypoints: Vec<OsrmTripWaypoint>,
    #[serde(default)]
    trips: Vec<OsrmTrip>,
}

#[derive(Debug, Deserialize)]
struct OsrmTripWaypoint {
    waypoint_index: usize,
}

#[derive(Debug, Deserialize)]
struct OsrmTrip {
    legs: Vec<OsrmLeg>,
    geometry: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: String,
}
