//! Route results and geometry.
//!
//! [`Polyline`] stores a route geometry as decoded coordinate samples.
//! Encoding/decoding happens at provider boundaries (when receiving an
//! encoded overview path), never inside the planning core.

use serde::{Deserialize, Serialize};

use crate::stop::{Coordinate, StopId};

/// A route geometry as a decoded coordinate sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Canonical output of any ordering operation, provider-optimized or manual.
///
/// `ordered` is the navigation order and is always a permutation of exactly
/// the pending stops that were submitted. The store's own list order remains
/// the manual/display order; the two may diverge while reconciling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Stop ids in visiting order.
    pub ordered: Vec<StopId>,
    /// Decoded path samples; empty when no geometry is available.
    pub geometry: Polyline,
    /// Total travel distance in meters.
    pub total_distance: f64,
    /// Total travel duration in seconds.
    pub total_duration: f64,
}

impl RouteResult {
    /// The trivial result for an empty pending set.
    pub fn empty() -> Self {
        Self {
            ordered: Vec::new(),
            geometry: Polyline::empty(),
            total_distance: 0.0,
            total_duration: 0.0,
        }
    }

    pub fn contains(&self, id: &StopId) -> bool {
        self.ordered.contains(id)
    }
}
