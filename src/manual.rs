//! Manual stop ordering.
//!
//! A user-driven reorder keeps the user's explicit order verbatim and never
//! consults the provider. Geometry and totals that described the previous
//! order are dropped rather than carried over.

use crate::route::{Polyline, RouteResult};
use crate::stop::Stop;

/// Build a [`RouteResult`] for the user's explicit pending-stop order.
///
/// Always succeeds; swap admissibility (both participants pending and
/// adjacent) is enforced by [`StopStore::swap_adjacent_pending`] before the
/// order ever reaches this adapter.
///
/// [`StopStore::swap_adjacent_pending`]: crate::store::StopStore::swap_adjacent_pending
pub fn plan_manual_order(pending_in_user_order: &[Stop]) -> RouteResult {
    RouteResult {
        ordered: pending_in_user_order
            .iter()
            .map(|stop| stop.id.clone())
            .collect(),
        geometry: Polyline::empty(),
        total_distance: 0.0,
        total_duration: 0.0,
    }
}
