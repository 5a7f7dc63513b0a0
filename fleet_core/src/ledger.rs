//! Flat-file persistence for vehicles, customers and rental records.
//!
//! Each resource is a line-oriented, comma-separated text file without a
//! header. Lines are only ever appended, under an exclusive file lock.

use crate::{Customer, CustomerId, Error, RecordKind, Result, Vehicle, VehicleStatus};
use chrono::NaiveDate;
use csv::StringRecord;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// The three independent resources kept by the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Vehicles,
    Customers,
    Records,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Vehicles => "vehicles",
            Resource::Customers => "customers",
            Resource::Records => "rental records",
        }
    }
}

/// Storage backend the rental engine reads at load and appends to on mutation
pub trait Ledger {
    /// Read every row of a resource.
    ///
    /// The outer error means the resource itself could not be read; inner
    /// errors are individual rows that failed to decode.
    fn read(&self, resource: Resource) -> Result<Vec<Result<StringRecord>>>;

    /// Append a single row to a resource
    fn append(&mut self, resource: Resource, fields: &[String]) -> Result<()>;
}

// ============================================================================
// Row encoding
// ============================================================================

/// `plate,make,model,year,status`
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRow {
    pub plate: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: i32,
    pub status: VehicleStatus,
}

impl VehicleRow {
    pub const FIELDS: usize = 5;

    /// Build the row for a vehicle. Returns `None` when no plate is set.
    pub fn from_vehicle(vehicle: &Vehicle) -> Option<Self> {
        Some(Self {
            plate: vehicle.license_plate()?.to_string(),
            make: vehicle.make().map(str::to_string),
            model: vehicle.model().map(str::to_string),
            year: vehicle.year(),
            status: vehicle.status(),
        })
    }

    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.plate.clone(),
            self.make.clone().unwrap_or_default(),
            self.model.clone().unwrap_or_default(),
            self.year.to_string(),
            self.status.to_string(),
        ]
    }

    pub fn parse(record: &StringRecord) -> Result<Self> {
        let fields = expect_fields(record, Self::FIELDS)?;
        Ok(Self {
            plate: fields[0].to_string(),
            make: non_empty(fields[1]),
            model: non_empty(fields[2]),
            year: parse_field(fields[3], "year")?,
            status: fields[4].parse()?,
        })
    }
}

/// `id,name`
#[derive(Clone, Debug, PartialEq)]
pub struct CustomerRow {
    pub id: CustomerId,
    pub name: String,
}

impl CustomerRow {
    pub const FIELDS: usize = 2;

    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            id: customer.id(),
            name: customer.name().to_string(),
        }
    }

    pub fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }

    pub fn parse(record: &StringRecord) -> Result<Self> {
        let fields = expect_fields(record, Self::FIELDS)?;
        Ok(Self {
            id: CustomerId(parse_field(fields[0], "customer id")?),
            name: fields[1].to_string(),
        })
    }
}

/// `kind,plate,customerName,isoDate,amount`
#[derive(Clone, Debug, PartialEq)]
pub struct RecordRow {
    pub kind: RecordKind,
    pub plate: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub amount: f64,
}

impl RecordRow {
    pub const FIELDS: usize = 5;

    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.plate.clone(),
            self.customer_name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            format_amount(self.amount),
        ]
    }

    pub fn parse(record: &StringRecord) -> Result<Self> {
        let fields = expect_fields(record, Self::FIELDS)?;
        Ok(Self {
            kind: fields[0].parse()?,
            plate: fields[1].to_string(),
            customer_name: fields[2].to_string(),
            date: NaiveDate::parse_from_str(fields[3], "%Y-%m-%d")
                .map_err(|e| Error::InvalidRow(format!("invalid date {:?}: {}", fields[3], e)))?,
            amount: parse_field(fields[4], "amount")?,
        })
    }
}

/// Amounts always carry a fractional part, e.g. `200.0`
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.is_finite() {
        format!("{:.1}", amount)
    } else {
        amount.to_string()
    }
}

/// Rows may carry trailing extra fields; only the first `count` are used
fn expect_fields(record: &StringRecord, count: usize) -> Result<Vec<&str>> {
    if record.len() < count {
        return Err(Error::InvalidRow(format!(
            "expected at least {} fields, found {}",
            count,
            record.len()
        )));
    }
    Ok(record.iter().take(count).collect())
}

fn parse_field<T>(value: &str, what: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidRow(format!("invalid {} {:?}: {}", what, value, e)))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ============================================================================
// Flat-file ledger
// ============================================================================

/// Locations of the three ledger files
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerPaths {
    pub vehicles: PathBuf,
    pub customers: PathBuf,
    pub records: PathBuf,
}

impl LedgerPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vehicles: dir.join("vehicles.txt"),
            customers: dir.join("customers.txt"),
            records: dir.join("rental_records.txt"),
        }
    }

    pub fn path(&self, resource: Resource) -> &Path {
        match resource {
            Resource::Vehicles => &self.vehicles,
            Resource::Customers => &self.customers,
            Resource::Records => &self.records,
        }
    }
}

/// Ledger backed by three text files on disk
#[derive(Clone, Debug)]
pub struct FlatFileLedger {
    paths: LedgerPaths,
}

impl FlatFileLedger {
    pub fn new(paths: LedgerPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Ledger for FlatFileLedger {
    fn read(&self, resource: Resource) -> Result<Vec<Result<StringRecord>>> {
        let path = self.paths.path(resource);
        let file = File::open(path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut rows = Vec::new();
        let mut io_error = None;
        {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(&file);
            for row in reader.records() {
                match row {
                    // An I/O failure spoils the whole resource, not one row
                    Err(e) if e.is_io_error() => {
                        io_error = Some(e);
                        break;
                    }
                    row => rows.push(row.map_err(Error::from)),
                }
            }
        }

        file.unlock()?;
        if let Some(e) = io_error {
            return Err(e.into());
        }
        tracing::debug!("Read {} {} rows from {:?}", rows.len(), resource.label(), path);
        Ok(rows)
    }

    fn append(&mut self, resource: Resource, fields: &[String]) -> Result<()> {
        let path = self.paths.path(resource);
        Self::ensure_parent_dir(path)?;

        // Open file for appending
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let written = {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(&file);
            writer
                .write_record(fields)
                .map_err(Error::from)
                .and_then(|_| writer.flush().map_err(Error::from))
        };

        file.unlock()?;
        written?;

        tracing::debug!("Appended {} row to {:?}", resource.label(), path);
        Ok(())
    }
}

// ============================================================================
// In-memory ledger
// ============================================================================

/// Ledger kept entirely in memory; resources never written read as missing
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    rows: HashMap<Resource, Vec<Vec<String>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended to a resource so far
    pub fn rows(&self, resource: Resource) -> &[Vec<String>] {
        self.rows.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Ledger for MemoryLedger {
    fn read(&self, resource: Resource) -> Result<Vec<Result<StringRecord>>> {
        let rows = self.rows.get(&resource).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no {} stored", resource.label()))
        })?;
        Ok(rows
            .iter()
            .map(|fields| Ok(StringRecord::from(fields.clone())))
            .collect())
    }

    fn append(&mut self, resource: Resource, fields: &[String]) -> Result<()> {
        self.rows.entry(resource).or_default().push(fields.to_vec());
        Ok(())
    }
}
