//! Ordered stop collection with status transitions and change tracking.
//!
//! The store is the single source of truth shared by the UI and the
//! coordinator. List order is the manual/display order. Every mutation bumps
//! a monotonic generation counter and appends an event to a journal;
//! observers drain the journal with [`StopStore::take_events`] and use the
//! generation as a fencing token for in-flight optimization.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::debug;

use crate::stop::{ProofOfDelivery, Stop, StopId, StopStatus};

/// Rejected stop-list mutations.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("unknown stop: {id}")]
    UnknownStop { id: StopId },

    /// Terminal statuses never transition again.
    #[error("stop {id} is already {status:?}")]
    AlreadyFinal { id: StopId, status: StopStatus },

    /// Membership is frozen once the route has started.
    #[error("stop list is frozen while the route is in progress")]
    RouteStarted,

    #[error("stop {id} already exists")]
    DuplicateStop { id: StopId },

    /// Manual reordering swaps display-list neighbours only.
    #[error("positions {a} and {b} are not adjacent")]
    NotAdjacent { a: usize, b: usize },

    /// Completed and skipped stops are pinned at their recorded position.
    #[error("stop {id} is not pending")]
    NotPending { id: StopId },

    #[error("position {index} is out of bounds")]
    OutOfBounds { index: usize },
}

/// A change applied to the store, in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added(StopId),
    Removed(StopId),
    StatusChanged { id: StopId, status: StopStatus },
    Reordered,
}

/// Delivery progress summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteProgress {
    pub pending: usize,
    pub done: usize,
    pub skipped: usize,
}

impl RouteProgress {
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && (self.done + self.skipped) > 0
    }
}

/// The mutable, ordered collection of delivery stops.
#[derive(Debug, Default)]
pub struct StopStore {
    stops: Vec<Stop>,
    generation: u64,
    route_started: bool,
    events: VecDeque<StoreEvent>,
}

impl StopStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an imported stop. Rejected once the route has started.
    pub fn add_stop(&mut self, stop: Stop) -> Result<(), StoreError> {
        if self.route_started {
            return Err(StoreError::RouteStarted);
        }
        if self.index_of(&stop.id).is_some() {
            return Err(StoreError::DuplicateStop { id: stop.id });
        }
        debug!(id = %stop.id, "stop added");
        let id = stop.id.clone();
        self.stops.push(stop);
        self.touch(StoreEvent::Added(id));
        Ok(())
    }

    /// Remove a stop. Only permitted before the route has started.
    pub fn remove_stop(&mut self, id: &StopId) -> Result<Stop, StoreError> {
        if self.route_started {
            return Err(StoreError::RouteStarted);
        }
        let index = self
            .index_of(id)
            .ok_or_else(|| StoreError::UnknownStop { id: id.clone() })?;
        let stop = self.stops.remove(index);
        debug!(id = %stop.id, "stop removed");
        self.touch(StoreEvent::Removed(stop.id.clone()));
        Ok(stop)
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Pending stops in display order.
    pub fn pending_stops(&self) -> Vec<&Stop> {
        self.stops.iter().filter(|stop| stop.is_pending()).collect()
    }

    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.stops.iter().find(|stop| &stop.id == id)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Complete a delivery, attaching its proof. `Pending → Done` only.
    pub fn mark_done(&mut self, id: &StopId, proof: ProofOfDelivery) -> Result<(), StoreError> {
        let stop = self.pending_stop_mut(id)?;
        stop.set_done(proof);
        debug!(id = %id, "stop marked done");
        self.touch(StoreEvent::StatusChanged {
            id: id.clone(),
            status: StopStatus::Done,
        });
        Ok(())
    }

    /// Skip a stop without proof. `Pending → Skipped` only.
    pub fn mark_skipped(&mut self, id: &StopId) -> Result<(), StoreError> {
        let stop = self.pending_stop_mut(id)?;
        stop.set_skipped();
        debug!(id = %id, "stop skipped");
        self.touch(StoreEvent::StatusChanged {
            id: id.clone(),
            status: StopStatus::Skipped,
        });
        Ok(())
    }

    /// Swap two display-list neighbours, both of which must be pending.
    ///
    /// This is the manual-reorder primitive: moving a stop further is a
    /// sequence of adjacent swaps, and finished stops stay pinned in place.
    pub fn swap_adjacent_pending(&mut self, a: usize, b: usize) -> Result<(), StoreError> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if hi >= self.stops.len() {
            return Err(StoreError::OutOfBounds { index: hi });
        }
        if hi - lo != 1 {
            return Err(StoreError::NotAdjacent { a, b });
        }
        for index in [lo, hi] {
            if !self.stops[index].is_pending() {
                return Err(StoreError::NotPending {
                    id: self.stops[index].id.clone(),
                });
            }
        }
        self.stops.swap(lo, hi);
        debug!(a = lo, b = hi, "pending stops swapped");
        self.touch(StoreEvent::Reordered);
        Ok(())
    }

    /// Update free-text notes. Display-only; does not invalidate routing.
    pub fn set_notes(&mut self, id: &StopId, notes: Option<String>) -> Result<(), StoreError> {
        let stop = self.stop_mut(id)?;
        stop.notes = notes;
        Ok(())
    }

    /// Freeze membership: from here on stops can change status and order but
    /// cannot be added or removed.
    pub fn begin_route(&mut self) {
        self.route_started = true;
    }

    pub fn route_started(&self) -> bool {
        self.route_started
    }

    /// Fencing token: bumped by every mutation that can invalidate in-flight
    /// optimization.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drain the change journal.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        self.events.drain(..).collect()
    }

    pub fn progress(&self) -> RouteProgress {
        let mut progress = RouteProgress::default();
        for stop in &self.stops {
            match stop.status() {
                StopStatus::Pending => progress.pending += 1,
                StopStatus::Done => progress.done += 1,
                StopStatus::Skipped => progress.skipped += 1,
            }
        }
        progress
    }

    fn touch(&mut self, event: StoreEvent) {
        self.generation += 1;
        self.events.push_back(event);
    }

    fn index_of(&self, id: &StopId) -> Option<usize> {
        self.stops.iter().position(|stop| &stop.id == id)
    }

    fn stop_mut(&mut self, id: &StopId) -> Result<&mut Stop, StoreError> {
        self.stops
            .iter_mut()
            .find(|stop| &stop.id == id)
            .ok_or_else(|| StoreError::UnknownStop { id: id.clone() })
    }

    fn pending_stop_mut(&mut self, id: &StopId) -> Result<&mut Stop, StoreError> {
        let stop = self.stop_mut(id)?;
        if !stop.is_pending() {
            return Err(StoreError::AlreadyFinal {
                id: stop.id.clone(),
                status: stop.status(),
            });
        }
        Ok(stop)
    }
}
