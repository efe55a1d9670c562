//! Status history: immutable facts about a parking lot's status over time.

use serde::{Deserialize, Serialize};

use crate::id::{HistoryId, ParkingLotId};
use crate::parking_lot::{Availability, ParkingLotStatus};
use crate::time::Timestamp;

/// Status and availability of one parking lot at a point in time.
///
/// Delivered either by an explicit history fetch or by a live push event;
/// both share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotHistory {
    pub id: HistoryId,
    pub parking_lot_id: ParkingLotId,
    pub status: ParkingLotStatus,
    pub availability: Availability,
    pub updated_at: Timestamp,
}

/// Append-only log of history records for one parking lot, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    records: Vec<ParkingLotHistory>,
}

impl HistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. A record whose id is already present is ignored,
    /// which makes duplicate delivery harmless.
    ///
    /// Returns `true` when the record was added.
    pub fn append(&mut self, record: ParkingLotHistory) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    #[must_use]
    pub fn contains(&self, id: &HistoryId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }

    /// Most recently appended record.
    #[must_use]
    pub fn latest(&self) -> Option<&ParkingLotHistory> {
        self.records.last()
    }

    #[must_use]
    pub fn records(&self) -> &[ParkingLotHistory] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ParkingLotHistory> for HistoryLog {
    fn from_iter<I: IntoIterator<Item = ParkingLotHistory>>(iter: I) -> Self {
        let mut log = Self::new();
        for record in iter {
            log.append(record);
        }
        log
    }
}
