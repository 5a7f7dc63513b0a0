use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fleet_core::*;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fleet")]
#[command(about = "Vehicle rental ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a vehicle
    AddVehicle {
        /// License plate, e.g. ABC123
        #[arg(long)]
        plate: String,

        #[arg(long, default_value = "")]
        make: String,

        #[arg(long, default_value = "")]
        model: String,

        #[arg(long)]
        year: i32,

        #[arg(long, value_enum, default_value_t = KindArg::Car)]
        kind: KindArg,
    },

    /// Register a customer
    AddCustomer {
        #[arg(long)]
        id: u32,

        #[arg(long)]
        name: String,
    },

    /// Rent an available vehicle
    Rent {
        #[arg(long)]
        plate: String,

        /// Customer ID
        #[arg(long)]
        customer: u32,

        /// Rental price
        #[arg(long)]
        amount: f64,

        /// Rental date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Return a rented vehicle
    Return {
        #[arg(long)]
        plate: String,

        /// Customer ID
        #[arg(long)]
        customer: u32,

        /// Extra fees charged on return
        #[arg(long, default_value_t = 0.0)]
        fees: f64,

        /// Return date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List vehicles, optionally filtered by status
    Vehicles {
        /// Available, Held, Rented, UnderMaintenance or OutOfService
        #[arg(long)]
        status: Option<VehicleStatus>,

        #[arg(long)]
        json: bool,
    },

    /// List customers
    Customers {
        #[arg(long)]
        json: bool,
    },

    /// Show the rental history
    History {
        #[arg(long)]
        json: bool,
    },

    /// Show what was loaded from the data files
    LoadReport {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Car,
    Minibus,
    PickupTruck,
}

impl From<KindArg> for VehicleKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Car => VehicleKind::Car,
            KindArg::Minibus => VehicleKind::Minibus,
            KindArg::PickupTruck => VehicleKind::PickupTruck,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    fleet_core::logging::init_with_level(&config.logging.level);

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let handle = RentalHandle::new(config.ledger_paths(&data_dir));

    match cli.command {
        Commands::AddVehicle {
            plate,
            make,
            model,
            year,
            kind,
        } => {
            let mut vehicle = Vehicle::new(kind.into(), &make, &model, year);
            vehicle.set_license_plate(&plate)?;
            let outcome = handle.with_mut(|system| system.add_vehicle(vehicle))?;
            Ok(report(outcome, format!("✓ Added vehicle {}", plate)))
        }

        Commands::AddCustomer { id, name } => {
            let customer = Customer::new(CustomerId(id), name.clone());
            let outcome = handle.with_mut(|system| system.add_customer(customer))?;
            Ok(report(outcome, format!("✓ Added customer {} ({})", id, name)))
        }

        Commands::Rent {
            plate,
            customer,
            amount,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            let outcome = handle.with_mut(|system| {
                system.rent_vehicle(&plate, CustomerId(customer), date, amount)
            })?;
            Ok(report(outcome, format!("✓ Vehicle {} rented to customer {}", plate, customer)))
        }

        Commands::Return {
            plate,
            customer,
            fees,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            let outcome = handle.with_mut(|system| {
                system.return_vehicle(&plate, CustomerId(customer), date, fees)
            })?;
            Ok(report(outcome, format!("✓ Vehicle {} returned by customer {}", plate, customer)))
        }

        Commands::Vehicles { status, json } => {
            handle.with(|system| {
                let vehicles: Vec<&Vehicle> = system.vehicles(status).collect();
                if json {
                    print_json(serde_json::to_value(&vehicles)?);
                } else {
                    display_vehicles(&vehicles, status);
                }
                Ok::<_, Error>(())
            })??;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Customers { json } => {
            handle.with(|system| {
                if json {
                    print_json(serde_json::to_value(system.customers())?);
                } else {
                    display_customers(system.customers());
                }
                Ok::<_, Error>(())
            })??;
            Ok(ExitCode::SUCCESS)
        }

        Commands::History { json } => {
            handle.with(|system| {
                let history: Vec<RecordView> = system.history().collect();
                if json {
                    print_json(serde_json::to_value(&history)?);
                } else {
                    display_history(&history);
                }
                Ok::<_, Error>(())
            })??;
            Ok(ExitCode::SUCCESS)
        }

        Commands::LoadReport { json } => {
            let load_report = handle.with(|system| system.load_report().clone())?;
            if json {
                print_json(serde_json::to_value(&load_report)?);
            } else {
                println!("{}", load_report);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Print the success message, or the refusal on stderr with a failing exit code
fn report(outcome: Outcome, success: String) -> ExitCode {
    match outcome {
        Ok(()) => {
            println!("{}", success);
            ExitCode::SUCCESS
        }
        Err(refusal) => {
            eprintln!("✗ {}", refusal);
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: Value) {
    println!("{:#}", value);
}

fn display_vehicles(vehicles: &[&Vehicle], status: Option<VehicleStatus>) {
    match status {
        Some(status) => println!("\n=== {} Vehicles ===", status),
        None => println!("\n=== All Vehicles ==="),
    }

    println!(
        "|{:<16} | {:<12} | {:<12} | {:<12} | {:<6} | {:<18} |",
        " Type", "Plate", "Make", "Model", "Year", "Status"
    );
    println!("|{}|", "-".repeat(92));

    for vehicle in vehicles {
        println!(
            "| {:<15} | {:<12} | {:<12} | {:<12} | {:<6} | {:<18} |",
            vehicle.kind().label(),
            vehicle.license_plate().map(Plate::as_str).unwrap_or(""),
            vehicle.make().unwrap_or(""),
            vehicle.model().unwrap_or(""),
            vehicle.year(),
            vehicle.status().as_str(),
        );
    }

    if vehicles.is_empty() {
        match status {
            Some(status) => println!("  No vehicles with Status: {}", status),
            None => println!("  No Vehicles found."),
        }
    }
    println!();
}

fn display_customers(customers: &[Customer]) {
    if customers.is_empty() {
        println!("  No customers found.");
    }
    for customer in customers {
        println!("  {}", customer);
    }
}

fn display_history(history: &[RecordView]) {
    if history.is_empty() {
        println!("  No rental history found.");
        return;
    }

    println!(
        "|{:<10} | {:<12} | {:<20} | {:<12} | {:<12} |",
        " Type", "Plate", "Customer", "Date", "Amount"
    );
    println!("|{}|", "-".repeat(79));

    for record in history {
        println!(
            "| {:<9} | {:<12} | {:<20} | {:<12} | ${:<11.2} |",
            record.kind.as_str(),
            record.vehicle.license_plate().map(Plate::as_str).unwrap_or(""),
            record.customer.name(),
            record.date.to_string(),
            record.amount,
        );
    }
    println!();
}
