use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SimError};

/// One depot vehicle as read from the fleet table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique vehicle identifier.
    #[serde(rename = "VehicleID", deserialize_with = "deserialize_vehicle_id")]
    pub vehicle_id: String,
    /// Maximum charging power (kW, > 0).
    #[serde(rename = "MaxChargeSpeed_kW")]
    pub max_charge_speed_kw: f64,
    /// Energy consumed per kilometre driven (kWh/km).
    #[serde(rename = "Efficiency_kWh_km")]
    pub efficiency_kwh_km: f64,
}

impl Vehicle {
    pub fn new(vehicle_id: impl Into<String>, max_charge_speed_kw: f64, efficiency_kwh_km: f64) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            max_charge_speed_kw,
            efficiency_kwh_km,
        }
    }
}

/// Canonical form of a vehicle id as it appears in either table.
///
/// Purely numeric ids drop their leading zeros, so `"007"` in the fleet table
/// and `"7"` in the route table name the same vehicle. Other ids are only
/// trimmed.
///
/// ```
/// use fleet_charge_sim::fleet::canonical_vehicle_id;
///
/// assert_eq!(canonical_vehicle_id(" 007 "), "7");
/// assert_eq!(canonical_vehicle_id("000"), "0");
/// assert_eq!(canonical_vehicle_id("V01"), "V01");
/// ```
pub fn canonical_vehicle_id(raw: &str) -> String {
    let id = raw.trim();
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = id.trim_start_matches('0');
        return if stripped.is_empty() { "0" } else { stripped }.to_string();
    }
    id.to_string()
}

pub(crate) fn deserialize_vehicle_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(canonical_vehicle_id(&raw))
}

/// Fleet table keyed by vehicle id, preserving input order.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    vehicles: IndexMap<String, Vehicle>,
}

impl Fleet {
    /// Builds the table from vehicle records.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DuplicateVehicle`] when an id appears twice.
    pub fn new(vehicles: impl IntoIterator<Item = Vehicle>) -> Result<Self> {
        let mut table = IndexMap::new();
        for vehicle in vehicles {
            let id = vehicle.vehicle_id.clone();
            if table.insert(id.clone(), vehicle).is_some() {
                return Err(SimError::DuplicateVehicle(id));
            }
        }
        Ok(Self { vehicles: table })
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Resolves the vehicle referenced by route `route_index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownVehicleReference`] if no vehicle matches.
    pub fn resolve(&self, route_index: usize, vehicle_id: &str) -> Result<&Vehicle> {
        self.get(vehicle_id)
            .ok_or_else(|| SimError::UnknownVehicleReference {
                route_index,
                vehicle_id: vehicle_id.to_string(),
            })
    }

    /// Vehicles in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_input_order() {
        let fleet = Fleet::new([
            Vehicle::new("B", 50.0, 1.2),
            Vehicle::new("A", 22.0, 0.9),
            Vehicle::new("C", 11.0, 0.3),
        ])
        .expect("ids are unique");
        let ids: Vec<&str> = fleet.iter().map(|v| v.vehicle_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Fleet::new([Vehicle::new("7", 50.0, 1.0), Vehicle::new("7", 22.0, 1.0)]);
        assert!(matches!(err, Err(SimError::DuplicateVehicle(ref id)) if id == "7"));
    }

    #[test]
    fn numeric_ids_lose_leading_zeros() {
        assert_eq!(canonical_vehicle_id("01"), "1");
        assert_eq!(canonical_vehicle_id("10"), "10");
        assert_eq!(canonical_vehicle_id("0"), "0");
        assert_eq!(canonical_vehicle_id("bus-01"), "bus-01");
        assert_eq!(canonical_vehicle_id(""), "");
    }

    #[test]
    fn resolve_reports_route_index() {
        let fleet = Fleet::new([Vehicle::new("1", 50.0, 1.0)]).expect("ids are unique");
        assert!(fleet.resolve(0, "1").is_ok());
        let err = fleet.resolve(4, "2");
        assert!(matches!(
            err,
            Err(SimError::UnknownVehicleReference { route_index: 4, ref vehicle_id }) if vehicle_id == "2"
        ));
    }
}
