//! Shared access to a single rental engine.
//!
//! A [`RentalHandle`] is created once and cloned to every caller that needs
//! the engine. The engine itself is loaded on first use and every clone
//! sees the same instance.

use crate::ledger::LedgerPaths;
use crate::{Error, RentalSystem, Result};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard};

struct Shared {
    paths: LedgerPaths,
    engine: OnceCell<Mutex<RentalSystem>>,
}

/// Cloneable handle to one lazily-loaded [`RentalSystem`]
#[derive(Clone)]
pub struct RentalHandle {
    shared: Arc<Shared>,
}

impl RentalHandle {
    /// Create a handle; nothing is read until the engine is first used
    pub fn new(paths: LedgerPaths) -> Self {
        Self {
            shared: Arc::new(Shared {
                paths,
                engine: OnceCell::new(),
            }),
        }
    }

    /// Whether the engine has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.shared.engine.get().is_some()
    }

    /// True when both handles point at the same engine
    pub fn same_instance(&self, other: &RentalHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Run `f` with shared access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&RentalSystem) -> R) -> Result<R> {
        let engine = self.lock()?;
        Ok(f(&*engine))
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// The lock is held for the whole closure, so a check-then-act
    /// sequence inside it cannot interleave with another caller.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut RentalSystem) -> R) -> Result<R> {
        let mut engine = self.lock()?;
        Ok(f(&mut *engine))
    }

    fn lock(&self) -> Result<MutexGuard<'_, RentalSystem>> {
        let engine = self.shared.engine.get_or_init(|| {
            tracing::debug!("Loading rental engine from {:?}", self.shared.paths);
            Mutex::new(RentalSystem::open(self.shared.paths.clone()))
        });
        engine
            .lock()
            .map_err(|_| Error::State("rental engine lock poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Customer, CustomerId, Vehicle, VehicleKind};
    use chrono::NaiveDate;
    use std::thread;

    fn seeded_handle(dir: &std::path::Path) -> RentalHandle {
        let handle = RentalHandle::new(LedgerPaths::in_dir(dir));
        handle
            .with_mut(|system| {
                let mut car = Vehicle::new(VehicleKind::Car, "Toyota", "Corolla", 2019);
                car.set_license_plate("AAA100").unwrap();
                system.add_vehicle(car).unwrap();
                system
                    .add_customer(Customer::new(CustomerId(1), "George"))
                    .unwrap();
            })
            .unwrap();
        handle
    }

    #[test]
    fn test_clones_share_one_engine() {
        let temp_dir = tempfile::tempdir().unwrap();
        let handle = seeded_handle(temp_dir.path());
        let other = handle.clone();

        assert!(handle.same_instance(&other));
        assert_eq!(other.with(|s| s.vehicles(None).count()).unwrap(), 1);

        let unrelated = RentalHandle::new(LedgerPaths::in_dir(temp_dir.path()));
        assert!(!handle.same_instance(&unrelated));
    }

    #[test]
    fn test_engine_loads_lazily() {
        let temp_dir = tempfile::tempdir().unwrap();
        let handle = RentalHandle::new(LedgerPaths::in_dir(temp_dir.path()));
        assert!(!handle.is_loaded());

        let report = handle.with(|s| s.load_report().clone()).unwrap();
        assert!(handle.is_loaded());
        assert!(report.vehicles.unavailable);
    }

    #[test]
    fn test_concurrent_rents_admit_one_winner() {
        let temp_dir = tempfile::tempdir().unwrap();
        let handle = seeded_handle(temp_dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    handle
                        .with_mut(|s| s.rent_vehicle("AAA100", CustomerId(1), date, 100.0))
                        .unwrap()
                        .is_ok()
                })
            })
            .collect();

        let wins = workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(handle.with(|s| s.rental_history().len()).unwrap(), 1);
    }
}
