//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use fleet_charge_sim::fleet::{PlannedRoute, RouteRecord, Vehicle};
use fleet_charge_sim::io::SimulationInputs;
use fleet_charge_sim::sim::{ChargePolicy, Engine, SimulationRun};

/// Vehicle table with an unused extra column.
pub const VEHICLES_CSV: &str = "VehicleID,MaxChargeSpeed_kW,Efficiency_kWh_km,Depot\n\
                                1,50,1.0,North\n\
                                2,22,0.8,North\n\
                                3,11,0.5,South\n";

/// Route table mixing time formats.
pub const ROUTES_CSV: &str = "VehicleID,RouteLength_km,ReturnTime,DepartureTime\n\
                              1,100,18:00,06:00\n\
                              2,50,19:30:00,5:30\n\
                              3,30,8:00 PM,07:00\n";

/// Hourly baseline: 24 points stretched over the 96-interval grid.
pub fn base_load_csv() -> String {
    let mut csv = String::from("Hour,Load_kW\n");
    for hour in 0..24 {
        csv.push_str(&format!("{hour},{}\n", 40.0 + hour as f64));
    }
    csv
}

/// Scenario A/B vehicle: 50 kW cap, 1 kWh/km.
pub fn scenario_vehicle() -> Vehicle {
    Vehicle::new("1", 50.0, 1.0)
}

/// Inputs for one 100 kWh route returning 18:00 and leaving 06:00.
pub fn scenario_a_inputs() -> SimulationInputs {
    SimulationInputs {
        vehicles: vec![scenario_vehicle()],
        routes: vec![RouteRecord::new("1", 100.0, "18:00", "06:00")],
        base_load_kw: vec![0.0; 96],
    }
}

/// Route with an explicit window, bypassing time parsing.
pub fn planned_route(
    vehicle: &Vehicle,
    return_interval: usize,
    departure_interval: usize,
    energy_kwh: f64,
) -> PlannedRoute {
    PlannedRoute {
        vehicle_id: vehicle.vehicle_id.clone(),
        route_length_km: energy_kwh,
        return_time: String::new(),
        departure_time: String::new(),
        return_interval,
        departure_interval,
        max_charge_speed_kw: vehicle.max_charge_speed_kw,
        efficiency_kwh_km: 1.0,
        energy_required_kwh: energy_kwh,
    }
}

/// Runs both policies, panicking on invalid inputs.
pub fn run_both(inputs: &SimulationInputs) -> SimulationRun {
    Engine::new(inputs)
        .and_then(|engine| engine.run(&ChargePolicy::ALL))
        .expect("inputs should be valid")
}

/// Fresh per-test scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fleet-charge-sim-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}
