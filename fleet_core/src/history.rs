//! Append-only rental history.

use crate::{RecordKind, RentalRecord};

/// Insertion-ordered log of rental records.
///
/// Records can only be appended; there is no way to edit or remove one.
#[derive(Clone, Debug, Default)]
pub struct RentalHistory {
    records: Vec<RentalRecord>,
}

impl RentalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: RentalRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RentalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record for a plate (case-insensitive)
    pub fn last_for_plate(&self, plate: &str) -> Option<&RentalRecord> {
        self.records.iter().rev().find(|r| r.plate.matches(plate))
    }

    /// Number of records of the given kind
    pub fn count_kind(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}
