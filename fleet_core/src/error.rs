//! Error types for the fleet_core library.

use crate::{CustomerId, VehicleStatus};
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fleet_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// License plate did not match three letters followed by three digits
    #[error("Invalid license plate {0:?}: must be 3 uppercase letters followed by 3 digits")]
    InvalidPlate(String),

    /// A stored line could not be decoded
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Shared engine state is unusable
    #[error("State error: {0}")]
    State(String),
}

/// A business rule refused the requested operation.
///
/// Refusals are expected outcomes, not failures: the engine state is left
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("Vehicle has no license plate")]
    MissingPlate,

    #[error("Duplicate vehicle: license plate {0} already exists")]
    DuplicatePlate(String),

    #[error("Duplicate customer: ID {0} already exists")]
    DuplicateCustomer(CustomerId),

    #[error("No vehicle with license plate {0}")]
    UnknownVehicle(String),

    #[error("No customer with ID {0}")]
    UnknownCustomer(CustomerId),

    #[error("Vehicle {plate} is not available for renting (status: {status})")]
    NotAvailable { plate: String, status: VehicleStatus },

    #[error("Vehicle {plate} is not rented (status: {status})")]
    NotRented { plate: String, status: VehicleStatus },
}

/// Outcome of an engine mutation
pub type Outcome = std::result::Result<(), Refusal>;
