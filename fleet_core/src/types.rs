//! Core domain types for the fleet rental ledger.
//!
//! This module defines the entities the rental engine keeps in memory:
//! - Vehicles, their plates, kinds and rental status
//! - Customers
//! - Rental records (rent and return transactions)

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Vehicle Types
// ============================================================================

/// Rental status of a vehicle.
///
/// Variant names are written verbatim to the vehicles file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleStatus {
    Available,
    Held,
    Rented,
    UnderMaintenance,
    OutOfService,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 5] = [
        VehicleStatus::Available,
        VehicleStatus::Held,
        VehicleStatus::Rented,
        VehicleStatus::UnderMaintenance,
        VehicleStatus::OutOfService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "Available",
            VehicleStatus::Held => "Held",
            VehicleStatus::Rented => "Rented",
            VehicleStatus::UnderMaintenance => "UnderMaintenance",
            VehicleStatus::OutOfService => "OutOfService",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        VehicleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidRow(format!("unknown vehicle status {:?}", s)))
    }
}

/// Category of vehicle, used only as a display label
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Car,
    Minibus,
    PickupTruck,
    /// Kind is not recorded in storage, so reloaded vehicles carry this
    #[default]
    Unspecified,
}

impl VehicleKind {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleKind::Car => "Car",
            VehicleKind::Minibus => "Minibus",
            VehicleKind::PickupTruck => "Pickup Truck",
            VehicleKind::Unspecified => "Unknown",
        }
    }
}

/// A validated license plate: three uppercase ASCII letters then three digits
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Plate(String);

impl Plate {
    pub fn parse(input: &str) -> Result<Self> {
        let bytes = input.as_bytes();
        let valid = bytes.len() == 6
            && bytes[..3].iter().all(u8::is_ascii_uppercase)
            && bytes[3..].iter().all(u8::is_ascii_digit);

        if valid {
            Ok(Plate(input.to_string()))
        } else {
            Err(Error::InvalidPlate(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for lookups
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rentable vehicle
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Vehicle {
    license_plate: Option<Plate>,
    make: Option<String>,
    model: Option<String>,
    year: i32,
    status: VehicleStatus,
    kind: VehicleKind,
}

impl Vehicle {
    /// Create an available vehicle with no plate.
    ///
    /// Make and model are title-cased; empty strings become `None`.
    pub fn new(kind: VehicleKind, make: &str, model: &str, year: i32) -> Self {
        Self {
            license_plate: None,
            make: title_case(make),
            model: title_case(model),
            year,
            status: VehicleStatus::Available,
            kind,
        }
    }

    /// Assign the license plate.
    ///
    /// On error the previous plate (if any) is kept.
    pub fn set_license_plate(&mut self, plate: &str) -> Result<()> {
        self.license_plate = Some(Plate::parse(plate)?);
        Ok(())
    }

    pub fn set_status(&mut self, status: VehicleStatus) {
        self.status = status;
    }

    pub fn license_plate(&self) -> Option<&Plate> {
        self.license_plate.as_ref()
    }

    pub fn make(&self) -> Option<&str> {
        self.make.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub(crate) fn plate_matches(&self, plate: &str) -> bool {
        self.license_plate
            .as_ref()
            .map_or(false, |p| p.matches(plate))
    }
}

/// First character upper-cased, the rest lower-cased
fn title_case(input: &str) -> Option<String> {
    let mut chars = input.chars();
    let first = chars.next()?;
    let mut out: String = first.to_uppercase().collect();
    out.push_str(&chars.as_str().to_lowercase());
    Some(out)
}

// ============================================================================
// Customer Types
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CustomerId(pub u32);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer; immutable once created
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Customer ID: {} | Name: {}", self.id, self.name)
    }
}

// ============================================================================
// Rental Record Types
// ============================================================================

/// Direction of a rental transaction
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    Rent,
    Return,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Rent => "RENT",
            RecordKind::Return => "RETURN",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RENT" => Ok(RecordKind::Rent),
            "RETURN" => Ok(RecordKind::Return),
            other => Err(Error::InvalidRow(format!("unknown record kind {:?}", other))),
        }
    }
}

/// One rent or return transaction.
///
/// Holds keys into the engine's collections rather than copies of the
/// vehicle and customer, so reads always see their latest state.
#[derive(Clone, Debug, PartialEq)]
pub struct RentalRecord {
    pub kind: RecordKind,
    pub plate: Plate,
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    /// Rental price for RENT, extra fees for RETURN
    pub amount: f64,
}

/// A rental record resolved against the engine's current collections
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RecordView<'a> {
    pub kind: RecordKind,
    pub vehicle: &'a Vehicle,
    pub customer: &'a Customer,
    pub date: NaiveDate,
    pub amount: f64,
}
