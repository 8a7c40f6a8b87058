use serde::{Deserialize, Serialize};
use tracing::debug;

use super::vehicle::{Fleet, deserialize_vehicle_id};
use crate::error::Result;
use crate::grid::{departure_interval, normalize_time, time_to_interval};

/// One scheduled trip as read from the route table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Vehicle driving the route (foreign key into the fleet table).
    #[serde(rename = "VehicleID", deserialize_with = "deserialize_vehicle_id")]
    pub vehicle_id: String,
    /// Route distance (km).
    #[serde(rename = "RouteLength_km")]
    pub route_length_km: f64,
    /// Wall-clock return to the depot.
    #[serde(rename = "ReturnTime")]
    pub return_time: String,
    /// Wall-clock departure, taken to be on the following day.
    #[serde(rename = "DepartureTime")]
    pub departure_time: String,
}

impl RouteRecord {
    pub fn new(
        vehicle_id: impl Into<String>,
        route_length_km: f64,
        return_time: impl Into<String>,
        departure_time: impl Into<String>,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            route_length_km,
            return_time: return_time.into(),
            departure_time: departure_time.into(),
        }
    }
}

/// A route with its charging window and energy requirement resolved.
///
/// Field order is the column order of the energy requirements export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    #[serde(rename = "VehicleID")]
    pub vehicle_id: String,
    #[serde(rename = "RouteLength_km")]
    pub route_length_km: f64,
    /// Normalized `HH:MM` return time.
    #[serde(rename = "ReturnTime")]
    pub return_time: String,
    /// Normalized `HH:MM` departure time.
    #[serde(rename = "DepartureTime")]
    pub departure_time: String,
    /// First interval the vehicle is available for charging.
    #[serde(rename = "ReturnInterval")]
    pub return_interval: usize,
    /// Last interval the vehicle is available, offset onto day two.
    #[serde(rename = "DepartureInterval")]
    pub departure_interval: usize,
    #[serde(rename = "MaxChargeSpeed_kW")]
    pub max_charge_speed_kw: f64,
    #[serde(rename = "Efficiency_kWh_km")]
    pub efficiency_kwh_km: f64,
    /// `RouteLength_km × Efficiency_kWh_km`.
    #[serde(rename = "EnergyRequired_kWh")]
    pub energy_required_kwh: f64,
}

/// Resolves one route against the fleet.
///
/// # Errors
///
/// Returns `UnknownVehicleReference` if the vehicle is missing, or
/// `InvalidTimeFormat` if either time cannot be parsed after normalization.
pub fn plan_route(route_index: usize, record: &RouteRecord, fleet: &Fleet) -> Result<PlannedRoute> {
    let vehicle = fleet.resolve(route_index, &record.vehicle_id)?;

    let return_time = normalize_time(&record.return_time);
    let departure_time = normalize_time(&record.departure_time);
    let return_interval = time_to_interval(&return_time)?;
    let departure_interval = departure_interval(&departure_time)?;

    Ok(PlannedRoute {
        vehicle_id: record.vehicle_id.clone(),
        route_length_km: record.route_length_km,
        return_time,
        departure_time,
        return_interval,
        departure_interval,
        max_charge_speed_kw: vehicle.max_charge_speed_kw,
        efficiency_kwh_km: vehicle.efficiency_kwh_km,
        energy_required_kwh: record.route_length_km * vehicle.efficiency_kwh_km,
    })
}

/// Resolves every route in table order, stopping at the first failure.
///
/// # Errors
///
/// See [`plan_route`].
pub fn plan_routes(records: &[RouteRecord], fleet: &Fleet) -> Result<Vec<PlannedRoute>> {
    let planned = records
        .iter()
        .enumerate()
        .map(|(i, record)| plan_route(i, record, fleet))
        .collect::<Result<Vec<_>>>()?;
    debug!(routes = planned.len(), "planned route energy requirements");
    Ok(planned)
}
