//! Great-circle distance estimation.
//!
//! Display-only proximity hints ("nearest remaining stop"). Visiting order
//! and travel times come from the directions provider; straight-line
//! estimates never feed the optimizer.

use crate::stop::{Coordinate, Stop};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// The pending, geocoded stop closest to `origin`, with its straight-line
/// distance in meters.
pub fn nearest_pending(origin: Coordinate, stops: &[Stop]) -> Option<(&Stop, f64)> {
    stops
        .iter()
        .filter(|stop| stop.is_pending())
        .filter_map(|stop| stop.geo.map(|geo| (stop, distance_meters(origin, geo))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
