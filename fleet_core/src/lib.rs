#![forbid(unsafe_code)]

//! Core domain model and rental engine for the fleet ledger.
//!
//! This crate provides:
//! - Domain types (vehicles, customers, rental records)
//! - The append-only rental history
//! - The rental engine and its status rules
//! - Flat-file persistence and startup reconciliation
//! - A shared, lazily-loaded engine handle

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod history;
pub mod ledger;
pub mod load;
pub mod engine;
pub mod handle;

// Re-export commonly used types
pub use error::{Error, Outcome, Refusal, Result};
pub use types::*;
pub use config::Config;
pub use history::RentalHistory;
pub use ledger::{FlatFileLedger, Ledger, LedgerPaths, MemoryLedger};
pub use load::{LoadReport, RowCounts};
pub use engine::RentalSystem;
pub use handle::RentalHandle;
