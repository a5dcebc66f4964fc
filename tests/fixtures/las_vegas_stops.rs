//! Real Las Vegas delivery addresses for road-network tests.
//!
//! Coordinates sit on the Nevada extract so OSRM can snap every stop.

use stop_planner::stop::{Coordinate, Stop};

/// Depot on the south end of the Strip; the driver's starting position.
pub const DEPOT: Coordinate = Coordinate {
    latitude: 36.0989,
    longitude: -115.1761,
};

/// A morning delivery run across downtown and the Strip, in import order
/// (deliberately not in a sensible visiting order).
pub fn delivery_run() -> Vec<Stop> {
    vec![
        stop(
            "lv-01",
            "Stop 1",
            "300 Stewart Ave, Las Vegas, NV 89101",
            36.1716,
            -115.1441,
        ),
        stop(
            "lv-02",
            "Stop 2",
            "3600 Las Vegas Blvd S, Las Vegas, NV 89109",
            36.1126,
            -115.1767,
        ),
        stop(
            "lv-03",
            "Stop 3",
            "770 Las Vegas Blvd N, Las Vegas, NV 89101",
            36.1782,
            -115.1352,
        ),
        stop(
            "lv-04",
            "Stop 4",
            "2880 Las Vegas Blvd S, Las Vegas, NV 89109",
            36.1362,
            -115.1633,
        ),
        stop(
            "lv-05",
            "Stop 5",
            "1 Main St, Las Vegas, NV 89101",
            36.1699,
            -115.1458,
        ),
        stop(
            "lv-06",
            "Stop 6",
            "3799 Las Vegas Blvd S, Las Vegas, NV 89109",
            36.1024,
            -115.1703,
        ),
    ]
}

fn stop(id: &str, label: &str, address: &str, lat: f64, lng: f64) -> Stop {
    Stop::new(id, label, address).with_geo(lat, lng)
}
