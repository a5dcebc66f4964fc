//! Delivery stop data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Opaque stop identifier, stable for the stop's lifetime.
///
/// Identity (not list position) is the key for tracking stops across
/// asynchronous boundaries; positions shift under reordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery status of a stop.
///
/// `Done` and `Skipped` are terminal; a stop never re-enters `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    Pending,
    Done,
    Skipped,
}

impl StopStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StopStatus::Pending)
    }
}

/// Proof captured when a delivery is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofOfDelivery {
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
    pub photo_ref: Option<String>,
}

impl ProofOfDelivery {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            note: None,
            photo_ref: None,
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_photo_ref(mut self, photo_ref: impl Into<String>) -> Self {
        self.photo_ref = Some(photo_ref.into());
        self
    }
}

/// A single delivery destination.
///
/// Status and proof are owned by the store's transition methods; everything
/// else is plain data filled in at import time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    /// Display name, e.g. a sequence-derived "Stop 4".
    pub label: String,
    /// Original or corrected postal address.
    pub raw_address: String,
    /// Geocoded position; absent until geocoding succeeds. Stops without a
    /// geocode are never submitted for optimization.
    pub geo: Option<Coordinate>,
    pub notes: Option<String>,
    status: StopStatus,
    pod: Option<ProofOfDelivery>,
}

impl Stop {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        raw_address: impl Into<String>,
    ) -> Self {
        Self {
            id: StopId::new(id),
            label: label.into(),
            raw_address: raw_address.into(),
            geo: None,
            notes: None,
            status: StopStatus::Pending,
            pod: None,
        }
    }

    pub fn with_geo(mut self, latitude: f64, longitude: f64) -> Self {
        self.geo = Some(Coordinate::new(latitude, longitude));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn status(&self) -> StopStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == StopStatus::Pending
    }

    /// Proof of delivery; present only once the stop is `Done`.
    pub fn pod(&self) -> Option<&ProofOfDelivery> {
        self.pod.as_ref()
    }

    /// Rendering position: the geocode when present, a neutral fallback
    /// otherwise. The fallback is a display compromise for list/map widgets;
    /// it is never a routing input.
    pub fn display_coordinate(&self) -> Coordinate {
        self.geo.unwrap_or(Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        })
    }

    pub(crate) fn set_done(&mut self, proof: ProofOfDelivery) {
        self.status = StopStatus::Done;
        self.pod = Some(proof);
    }

    pub(crate) fn set_skipped(&mut self) {
        self.status = StopStatus::Skipped;
    }
}
