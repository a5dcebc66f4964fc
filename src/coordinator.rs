//! Route optimization coordination.
//!
//! The coordinator owns the single active [`RouteResult`] and decides which
//! trigger invokes which adapter: initial plan and delivery completion go to
//! the provider-backed client, manual reordering to the local adapter.
//!
//! The provider call is the only suspension point in the system, so the
//! coordinator never performs it directly. Triggers produce [`OptimizeJob`]
//! snapshots fenced with the store generation at issuance; the host runs the
//! job however it schedules I/O and feeds the outcome back through
//! [`RouteCoordinator::complete`], which applies it only if no invalidating
//! mutation happened in between. A stale result is computed, discarded, and
//! replaced by a fresh request; it is never merged.

use tracing::{debug, info, warn};

use crate::client::RouteOptimizationClient;
use crate::manual::plan_manual_order;
use crate::route::RouteResult;
use crate::stop::{Coordinate, Stop};
use crate::store::{StopStore, StoreError, StoreEvent};
use crate::traits::{DirectionsProvider, OptimizeError};

/// Everything one optimization call needs, snapshotted at issuance.
#[derive(Debug, Clone)]
pub struct OptimizeJob {
    fence: u64,
    pub origin: Coordinate,
    /// Pending, geocoded stops in display order.
    pub stops: Vec<Stop>,
}

impl OptimizeJob {
    /// The store generation this job was computed against.
    pub fn fence(&self) -> u64 {
        self.fence
    }
}

/// What became of a completed optimization.
#[derive(Debug)]
pub enum PlanOutcome {
    /// Result installed as the active route.
    Applied,
    /// The stop set changed while the call was in flight; result discarded
    /// and a replan scheduled for the next [`RouteCoordinator::poll`].
    Stale,
    /// Provider failure. Non-fatal: the active route is simply not updated
    /// and deliveries continue in display order.
    Failed(OptimizeError),
}

/// Stateful arbiter of the active route.
#[derive(Debug, Default)]
pub struct RouteCoordinator {
    active: Option<RouteResult>,
    origin: Option<Coordinate>,
    in_flight: Option<u64>,
    replan_pending: bool,
}

impl RouteCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current navigation-order route, if any.
    pub fn active_route(&self) -> Option<&RouteResult> {
        self.active.as_ref()
    }

    /// Whether an optimization job is outstanding.
    pub fn is_optimizing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Record the driver's current position for subsequent plans.
    pub fn update_origin(&mut self, origin: Coordinate) {
        self.origin = Some(origin);
    }

    /// Start the route: freeze membership and plan the first visiting order.
    ///
    /// Returns the job to run, or `None` when there is nothing to plan. The
    /// UI observes the outcome through [`RouteCoordinator::active_route`].
    pub fn request_initial_plan(
        &mut self,
        store: &mut StopStore,
        origin: Coordinate,
    ) -> Option<OptimizeJob> {
        self.origin = Some(origin);
        store.begin_route();
        // Import-time events are not routing triggers.
        store.take_events();
        self.active = None;
        self.replan_pending = false;
        // A single remaining stop still gets a direct-route plan here; the
        // client handles it without waypoint optimization.
        self.issue(store, 1)
    }

    /// Swap two adjacent pending stops and install the manual order.
    ///
    /// Succeeds or fails synchronously; on success the active route is the
    /// user's explicit order (empty geometry, zero totals).
    pub fn request_manual_swap(
        &mut self,
        store: &mut StopStore,
        a: usize,
        b: usize,
    ) -> Result<(), StoreError> {
        store.swap_adjacent_pending(a, b)?;
        self.absorb_events(store);
        Ok(())
    }

    /// React to store changes since the last call: classify accumulated
    /// triggers and, when the stop set calls for it, issue a fresh
    /// optimization job.
    ///
    /// Completion/skip triggers re-optimize only while two or more routable
    /// stops remain; with one the visiting order is self-evident and with
    /// zero the route is complete. Either way the previous route is cleared
    /// so stale geometry never lingers.
    pub fn poll(&mut self, store: &mut StopStore) -> Option<OptimizeJob> {
        self.absorb_events(store);
        if !self.replan_pending {
            return None;
        }
        if self.in_flight.is_some() {
            // Serialized: the pending replan is picked up after completion.
            return None;
        }
        self.replan_pending = false;
        self.issue(store, 2)
    }

    /// Feed back the outcome of a job issued earlier.
    ///
    /// The result is applied only when the stop set is unchanged since the
    /// job was issued; otherwise it is discarded and the next [`poll`] issues
    /// a fresh request against current state.
    ///
    /// [`poll`]: RouteCoordinator::poll
    pub fn complete(
        &mut self,
        store: &StopStore,
        job: &OptimizeJob,
        outcome: Result<RouteResult, OptimizeError>,
    ) -> PlanOutcome {
        if self.in_flight != Some(job.fence) {
            debug!(fence = job.fence, "ignoring completion of superseded job");
            return PlanOutcome::Stale;
        }
        self.in_flight = None;

        if store.generation() != job.fence {
            debug!(
                fence = job.fence,
                generation = store.generation(),
                "discarding stale optimization result"
            );
            // Re-trigger only when the invalidating mutation left no route
            // behind; a manual reorder installs its own result and must not
            // be clobbered by a fresh provider pass.
            self.replan_pending = self.active.is_none();
            return PlanOutcome::Stale;
        }

        match outcome {
            Ok(result) => {
                info!(
                    stops = result.ordered.len(),
                    distance_m = result.total_distance,
                    duration_s = result.total_duration,
                    "route optimized"
                );
                self.active = Some(result);
                PlanOutcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "route optimization failed");
                PlanOutcome::Failed(err)
            }
        }
    }

    /// Poll, run, and complete pending jobs inline until the store is
    /// settled.
    ///
    /// Convenience for hosts without their own scheduler; hosts that run the
    /// provider call elsewhere use [`poll`]/[`complete`] directly.
    ///
    /// [`poll`]: RouteCoordinator::poll
    /// [`complete`]: RouteCoordinator::complete
    pub fn drive<P: DirectionsProvider>(
        &mut self,
        store: &mut StopStore,
        client: &RouteOptimizationClient<P>,
    ) {
        while let Some(job) = self.poll(store) {
            let outcome = client.optimize(job.origin, &job.stops);
            self.complete(store, &job, outcome);
        }
    }

    /// Drain the store journal and fold the events into coordinator state.
    fn absorb_events(&mut self, store: &mut StopStore) {
        let events = store.take_events();
        if events.is_empty() {
            return;
        }

        let mut reordered = false;
        let mut invalidated = false;
        for event in &events {
            match event {
                StoreEvent::Reordered => reordered = true,
                StoreEvent::StatusChanged { .. }
                | StoreEvent::Added(_)
                | StoreEvent::Removed(_) => invalidated = true,
            }
        }

        // Any mutation makes previously computed geometry stale.
        self.active = None;

        if invalidated {
            self.replan_pending = true;
        } else if reordered {
            // Manual order replaces provider optimization outright; the
            // in-flight job, if any, is already fenced out by the bump.
            let result = plan_manual_order(&routable_snapshot(store));
            debug!(stops = result.ordered.len(), "applied manual order");
            self.active = Some(result);
        }
    }

    fn issue(&mut self, store: &StopStore, min_stops: usize) -> Option<OptimizeJob> {
        let stops = routable_snapshot(store);
        if stops.len() < min_stops {
            if store.progress().is_complete() {
                info!("route complete");
            }
            return None;
        }
        let origin = self.origin?;
        if self.in_flight.is_some() {
            self.replan_pending = true;
            return None;
        }

        let fence = store.generation();
        self.in_flight = Some(fence);
        debug!(fence, stops = stops.len(), "issuing optimization");
        Some(OptimizeJob {
            fence,
            origin,
            stops,
        })
    }
}

/// Pending stops eligible for routing, cloned in display order. Stops
/// without a geocode stay on the list for display but are never routed.
fn routable_snapshot(store: &StopStore) -> Vec<Stop> {
    store
        .pending_stops()
        .into_iter()
        .filter(|stop| stop.geo.is_some())
        .cloned()
        .collect()
}
