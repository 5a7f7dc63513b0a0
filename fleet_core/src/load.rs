//! Startup loading and reconciliation of the ledger.
//!
//! Loading never fails. Unreadable resources, garbled rows, duplicates and
//! records pointing at unknown vehicles or customers are dropped, and every
//! drop is counted in the [`LoadReport`].

use crate::ledger::{CustomerRow, Ledger, RecordRow, Resource, VehicleRow};
use crate::{
    Customer, RecordKind, RentalHistory, RentalRecord, Result, Vehicle, VehicleKind,
    VehicleStatus,
};
use csv::StringRecord;
use serde::Serialize;
use std::fmt;

/// Per-resource row accounting
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    /// The resource could not be opened or read at all
    pub unavailable: bool,
    pub accepted: usize,
    /// Rows that failed to decode
    pub malformed: usize,
    /// Rows whose key was already loaded
    pub duplicate: usize,
    /// Record rows whose plate or customer name matched nothing
    pub unmatched: usize,
}

impl RowCounts {
    pub fn dropped(&self) -> usize {
        self.malformed + self.duplicate + self.unmatched
    }
}

/// Outcome of loading the ledger into memory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub vehicles: RowCounts,
    pub customers: RowCounts,
    pub records: RowCounts,
    /// Vehicles whose status was brought in line with their last record
    pub statuses_restored: usize,
}

impl LoadReport {
    pub fn total_dropped(&self) -> usize {
        self.vehicles.dropped() + self.customers.dropped() + self.records.dropped()
    }

    pub fn is_clean(&self) -> bool {
        self.total_dropped() == 0
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, counts) in [
            ("vehicles", &self.vehicles),
            ("customers", &self.customers),
            ("records", &self.records),
        ] {
            if counts.unavailable {
                writeln!(f, "{:<10} no data", label)?;
            } else {
                writeln!(
                    f,
                    "{:<10} {} loaded, {} malformed, {} duplicate, {} unmatched",
                    label, counts.accepted, counts.malformed, counts.duplicate, counts.unmatched
                )?;
            }
        }
        write!(f, "statuses restored from history: {}", self.statuses_restored)
    }
}

/// Everything recovered from the ledger
pub(crate) struct Loaded {
    pub vehicles: Vec<Vehicle>,
    pub customers: Vec<Customer>,
    pub history: RentalHistory,
    pub report: LoadReport,
}

pub(crate) fn load_all(ledger: &dyn Ledger) -> Loaded {
    let mut report = LoadReport::default();

    let vehicles = load_vehicles(ledger, &mut report.vehicles);
    let customers = load_customers(ledger, &mut report.customers);
    let history = load_records(ledger, &vehicles, &customers, &mut report.records);

    let mut loaded = Loaded {
        vehicles,
        customers,
        history,
        report,
    };
    loaded.report.statuses_restored = replay_statuses(&mut loaded.vehicles, &loaded.history);

    tracing::info!(
        "Loaded {} vehicles, {} customers, {} rental records ({} rows dropped)",
        loaded.vehicles.len(),
        loaded.customers.len(),
        loaded.history.len(),
        loaded.report.total_dropped()
    );
    loaded
}

/// Read and decode the rows of one resource, counting failures
fn read_rows<T>(
    ledger: &dyn Ledger,
    resource: Resource,
    parse: impl Fn(&StringRecord) -> Result<T>,
    counts: &mut RowCounts,
) -> Vec<T> {
    let rows = match ledger.read(resource) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("No {} loaded: {}", resource.label(), e);
            counts.unavailable = true;
            return Vec::new();
        }
    };

    let mut parsed = Vec::with_capacity(rows.len());
    for (line_num, row) in rows.into_iter().enumerate() {
        match row.and_then(|record| parse(&record)) {
            Ok(value) => parsed.push(value),
            Err(e) => {
                tracing::warn!(
                    "Skipping {} row at line {}: {}",
                    resource.label(),
                    line_num + 1,
                    e
                );
                counts.malformed += 1;
            }
        }
    }
    parsed
}

fn load_vehicles(ledger: &dyn Ledger, counts: &mut RowCounts) -> Vec<Vehicle> {
    let mut vehicles: Vec<Vehicle> = Vec::new();

    for row in read_rows(ledger, Resource::Vehicles, VehicleRow::parse, counts) {
        if vehicles.iter().any(|v| v.plate_matches(&row.plate)) {
            tracing::warn!("Skipping duplicate vehicle {}", row.plate);
            counts.duplicate += 1;
            continue;
        }

        let mut vehicle = Vehicle::new(
            VehicleKind::Unspecified,
            row.make.as_deref().unwrap_or(""),
            row.model.as_deref().unwrap_or(""),
            row.year,
        );
        if let Err(e) = vehicle.set_license_plate(&row.plate) {
            tracing::warn!("Skipping vehicle row: {}", e);
            counts.malformed += 1;
            continue;
        }
        vehicle.set_status(row.status);
        vehicles.push(vehicle);
        counts.accepted += 1;
    }

    vehicles
}

fn load_customers(ledger: &dyn Ledger, counts: &mut RowCounts) -> Vec<Customer> {
    let mut customers: Vec<Customer> = Vec::new();

    for row in read_rows(ledger, Resource::Customers, CustomerRow::parse, counts) {
        if customers.iter().any(|c| c.id() == row.id) {
            tracing::warn!("Skipping duplicate customer {}", row.id);
            counts.duplicate += 1;
            continue;
        }
        customers.push(Customer::new(row.id, row.name));
        counts.accepted += 1;
    }

    customers
}

fn load_records(
    ledger: &dyn Ledger,
    vehicles: &[Vehicle],
    customers: &[Customer],
    counts: &mut RowCounts,
) -> RentalHistory {
    let mut history = RentalHistory::new();

    for row in read_rows(ledger, Resource::Records, RecordRow::parse, counts) {
        let plate = vehicles
            .iter()
            .find(|v| v.plate_matches(&row.plate))
            .and_then(Vehicle::license_plate);
        let customer = customers.iter().find(|c| c.name() == row.customer_name);

        match (plate, customer) {
            (Some(plate), Some(customer)) => {
                history.add_record(RentalRecord {
                    kind: row.kind,
                    plate: plate.clone(),
                    customer_id: customer.id(),
                    date: row.date,
                    amount: row.amount,
                });
                counts.accepted += 1;
            }
            _ => {
                tracing::warn!(
                    "Dropping {} record for {} / {}: no matching vehicle or customer",
                    row.kind,
                    row.plate,
                    row.customer_name
                );
                counts.unmatched += 1;
            }
        }
    }

    history
}

/// The vehicles file only holds the status a vehicle was created with, so
/// rental state is re-derived from the last record of each vehicle.
/// Administrative statuses are left untouched.
fn replay_statuses(vehicles: &mut [Vehicle], history: &RentalHistory) -> usize {
    let mut restored = 0;

    for vehicle in vehicles.iter_mut() {
        if !matches!(
            vehicle.status(),
            VehicleStatus::Available | VehicleStatus::Rented
        ) {
            continue;
        }
        let Some(plate) = vehicle.license_plate() else {
            continue;
        };
        let Some(last) = history.last_for_plate(plate.as_str()) else {
            continue;
        };

        let expected = match last.kind {
            RecordKind::Rent => VehicleStatus::Rented,
            RecordKind::Return => VehicleStatus::Available,
        };
        if vehicle.status() != expected {
            tracing::debug!("Restoring {} to {} from history", plate, expected);
            vehicle.set_status(expected);
            restored += 1;
        }
    }

    restored
}
