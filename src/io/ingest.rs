//! CSV ingestion of the vehicle, route and baseline load tables.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SimError};
use crate::fleet::{RouteRecord, Vehicle};

/// The three input tables of one simulation run.
///
/// Serialized with the same column names as the CSV files, so a JSON request
/// body mirrors the uploaded tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub vehicles: Vec<Vehicle>,
    pub routes: Vec<RouteRecord>,
    /// Baseline load values (kW), any length ≥ 1.
    pub base_load_kw: Vec<f64>,
}

impl SimulationInputs {
    /// Boundary checks on record values.
    ///
    /// Vehicle references, time strings and the baseline length are checked
    /// later by the components that consume them.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRecord`] for the first offending record.
    pub fn validate(&self) -> Result<()> {
        for (row, v) in self.vehicles.iter().enumerate() {
            let invalid = |message: &str| SimError::InvalidRecord {
                table: "vehicles",
                row,
                message: message.to_string(),
            };
            if v.vehicle_id.trim().is_empty() {
                return Err(invalid("VehicleID is empty"));
            }
            if !v.max_charge_speed_kw.is_finite() || v.max_charge_speed_kw <= 0.0 {
                return Err(invalid("MaxChargeSpeed_kW must be a finite number > 0"));
            }
            if !v.efficiency_kwh_km.is_finite() || v.efficiency_kwh_km < 0.0 {
                return Err(invalid("Efficiency_kWh_km must be a finite number >= 0"));
            }
        }

        for (row, r) in self.routes.iter().enumerate() {
            let invalid = |message: &str| SimError::InvalidRecord {
                table: "routes",
                row,
                message: message.to_string(),
            };
            if r.vehicle_id.trim().is_empty() {
                return Err(invalid("VehicleID is empty"));
            }
            if !r.route_length_km.is_finite() || r.route_length_km < 0.0 {
                return Err(invalid("RouteLength_km must be a finite number >= 0"));
            }
        }

        if let Some(row) = self.base_load_kw.iter().position(|kw| !kw.is_finite()) {
            return Err(SimError::InvalidRecord {
                table: "base_load",
                row,
                message: "Load_kW must be a finite number".to_string(),
            });
        }

        Ok(())
    }
}

/// File locations of the three input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub vehicles: PathBuf,
    pub routes: PathBuf,
    pub base_load: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BaseLoadRecord {
    #[serde(rename = "Load_kW")]
    load_kw: f64,
}

fn read_table<T: DeserializeOwned>(reader: impl Read, table: &'static str) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize()
        .map(|record| record.map_err(|source| SimError::Csv { table, source }))
        .collect()
}

/// Reads the fleet table (`VehicleID`, `MaxChargeSpeed_kW`, `Efficiency_kWh_km`).
///
/// # Errors
///
/// Returns [`SimError::Csv`] if a column is missing or a value does not parse.
pub fn read_vehicles(reader: impl Read) -> Result<Vec<Vehicle>> {
    read_table(reader, "vehicles")
}

/// Reads the route table (`VehicleID`, `RouteLength_km`, `ReturnTime`, `DepartureTime`).
///
/// # Errors
///
/// Returns [`SimError::Csv`] if a column is missing or a value does not parse.
pub fn read_routes(reader: impl Read) -> Result<Vec<RouteRecord>> {
    read_table(reader, "routes")
}

/// Reads the `Load_kW` column of the baseline table.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if the column is missing or a value does not parse.
pub fn read_base_load(reader: impl Read) -> Result<Vec<f64>> {
    let records: Vec<BaseLoadRecord> = read_table(reader, "base_load")?;
    Ok(records.into_iter().map(|r| r.load_kw).collect())
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| {
        SimError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open \"{}\": {e}", path.display()),
        ))
    })
}

/// Reads all three tables from disk.
///
/// # Errors
///
/// Returns the first read or parse error.
pub fn load_inputs(paths: &InputPaths) -> Result<SimulationInputs> {
    let vehicles = read_vehicles(open(&paths.vehicles)?)?;
    let routes = read_routes(open(&paths.routes)?)?;
    let base_load_kw = read_base_load(open(&paths.base_load)?)?;

    info!(
        vehicles = vehicles.len(),
        routes = routes.len(),
        base_load_points = base_load_kw.len(),
        "input tables loaded"
    );

    Ok(SimulationInputs {
        vehicles,
        routes,
        base_load_kw,
    })
}
