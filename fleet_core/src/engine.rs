//! Rental engine: the system of record for vehicles, customers and history.
//!
//! This module implements the rental lifecycle:
//! - Uniqueness of vehicle plates and customer ids
//! - The `Available -> Rented -> Available` status transitions
//! - Appending every successful mutation to the ledger
//!
//! Business-rule refusals are returned as [`Refusal`] values and leave the
//! engine untouched. Ledger write failures are logged; the in-memory
//! mutation that preceded them is kept.

use crate::ledger::{
    CustomerRow, FlatFileLedger, Ledger, LedgerPaths, RecordRow, Resource, VehicleRow,
};
use crate::load::{load_all, LoadReport};
use crate::{
    Customer, CustomerId, Outcome, RecordKind, RecordView, Refusal, RentalHistory, RentalRecord,
    Vehicle, VehicleStatus,
};
use chrono::NaiveDate;

/// Owns the in-memory collections and mediates all writes to the ledger
pub struct RentalSystem {
    vehicles: Vec<Vehicle>,
    customers: Vec<Customer>,
    history: RentalHistory,
    ledger: Box<dyn Ledger + Send>,
    load_report: LoadReport,
}

impl RentalSystem {
    /// Load every resource from `ledger` and reconcile the rental records
    pub fn load(ledger: impl Ledger + Send + 'static) -> Self {
        let loaded = load_all(&ledger);
        Self {
            vehicles: loaded.vehicles,
            customers: loaded.customers,
            history: loaded.history,
            ledger: Box::new(ledger),
            load_report: loaded.report,
        }
    }

    /// Load from the flat files at `paths`
    pub fn open(paths: LedgerPaths) -> Self {
        Self::load(FlatFileLedger::new(paths))
    }

    /// What happened while loading the ledger
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Outcome {
        let row =
            VehicleRow::from_vehicle(&vehicle).ok_or_else(|| refuse(Refusal::MissingPlate))?;

        if self.find_vehicle_by_plate(&row.plate).is_some() {
            return Err(refuse(Refusal::DuplicatePlate(row.plate)));
        }

        self.vehicles.push(vehicle);
        self.persist(Resource::Vehicles, row.to_fields());
        tracing::info!("Added vehicle {}", row.plate);
        Ok(())
    }

    pub fn add_customer(&mut self, customer: Customer) -> Outcome {
        if self.find_customer_by_id(customer.id()).is_some() {
            return Err(refuse(Refusal::DuplicateCustomer(customer.id())));
        }

        let row = CustomerRow::from_customer(&customer);
        self.customers.push(customer);
        self.persist(Resource::Customers, row.to_fields());
        tracing::info!("Added customer {}", row.id);
        Ok(())
    }

    /// Rent an `Available` vehicle, recording the rental price
    pub fn rent_vehicle(
        &mut self,
        plate: &str,
        customer_id: CustomerId,
        date: NaiveDate,
        amount: f64,
    ) -> Outcome {
        self.transition(RecordKind::Rent, plate, customer_id, date, amount)
    }

    /// Return a `Rented` vehicle, recording any extra fees
    pub fn return_vehicle(
        &mut self,
        plate: &str,
        customer_id: CustomerId,
        date: NaiveDate,
        extra_fees: f64,
    ) -> Outcome {
        self.transition(RecordKind::Return, plate, customer_id, date, extra_fees)
    }

    fn transition(
        &mut self,
        kind: RecordKind,
        plate: &str,
        customer_id: CustomerId,
        date: NaiveDate,
        amount: f64,
    ) -> Outcome {
        let (from, to) = match kind {
            RecordKind::Rent => (VehicleStatus::Available, VehicleStatus::Rented),
            RecordKind::Return => (VehicleStatus::Rented, VehicleStatus::Available),
        };

        let customer_name = match self.find_customer_by_id(customer_id) {
            Some(customer) => customer.name().to_string(),
            None => return Err(refuse(Refusal::UnknownCustomer(customer_id))),
        };

        let Some(vehicle) = self.vehicles.iter_mut().find(|v| v.plate_matches(plate)) else {
            return Err(refuse(Refusal::UnknownVehicle(plate.to_string())));
        };
        let Some(vehicle_plate) = vehicle.license_plate().cloned() else {
            return Err(refuse(Refusal::UnknownVehicle(plate.to_string())));
        };

        if vehicle.status() != from {
            let plate = vehicle_plate.to_string();
            let status = vehicle.status();
            return Err(refuse(match kind {
                RecordKind::Rent => Refusal::NotAvailable { plate, status },
                RecordKind::Return => Refusal::NotRented { plate, status },
            }));
        }

        vehicle.set_status(to);

        let row = RecordRow {
            kind,
            plate: vehicle_plate.to_string(),
            customer_name,
            date,
            amount,
        };
        self.history.add_record(RentalRecord {
            kind,
            plate: vehicle_plate,
            customer_id,
            date,
            amount,
        });
        self.persist(Resource::Records, row.to_fields());

        let verb = match kind {
            RecordKind::Rent => "rented to",
            RecordKind::Return => "returned by",
        };
        tracing::info!("Vehicle {} {} {}", row.plate, verb, row.customer_name);
        Ok(())
    }

    /// Administrative status override.
    ///
    /// Not gated by the rental rules and not written to the ledger.
    pub fn set_vehicle_status(&mut self, plate: &str, status: VehicleStatus) -> Outcome {
        let vehicle = self
            .vehicles
            .iter_mut()
            .find(|v| v.plate_matches(plate))
            .ok_or_else(|| refuse(Refusal::UnknownVehicle(plate.to_string())))?;

        tracing::info!(
            "Status of {} overridden: {} -> {}",
            plate,
            vehicle.status(),
            status
        );
        vehicle.set_status(status);
        Ok(())
    }

    /// Case-insensitive plate lookup
    pub fn find_vehicle_by_plate(&self, plate: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.plate_matches(plate))
    }

    pub fn find_customer_by_id(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id() == id)
    }

    /// Vehicles in insertion order, optionally only those with `status`
    pub fn vehicles(
        &self,
        status: Option<VehicleStatus>,
    ) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles
            .iter()
            .filter(move |v| status.map_or(true, |s| v.status() == s))
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Rental history resolved against the current vehicles and customers
    pub fn history(&self) -> impl Iterator<Item = RecordView<'_>> + '_ {
        self.history.records().iter().filter_map(move |record| {
            Some(RecordView {
                kind: record.kind,
                vehicle: self.find_vehicle_by_plate(record.plate.as_str())?,
                customer: self.find_customer_by_id(record.customer_id)?,
                date: record.date,
                amount: record.amount,
            })
        })
    }

    pub fn rental_history(&self) -> &RentalHistory {
        &self.history
    }

    fn persist(&mut self, resource: Resource, fields: Vec<String>) {
        if let Err(e) = self.ledger.append(resource, &fields) {
            // Memory and storage now disagree; nothing is rolled back.
            tracing::error!("Error saving {} row {:?}: {}", resource.label(), fields, e);
        }
    }
}

fn refuse(refusal: Refusal) -> Refusal {
    tracing::info!("{}", refusal);
    refusal
}
