//! Per-route charge scheduling into per-vehicle interval series.
//!
//! Each vehicle owns its own pair of series. Routes are applied in route-table
//! order because `ChargeAmount_kWh` is a running total that a later route
//! for the same vehicle reads and extends.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::policy::ChargePolicy;
use crate::error::{Result, SimError};
use crate::fleet::{Fleet, PlannedRoute, Vehicle};
use crate::grid::{INTERVAL_HOURS, TOTAL_INTERVALS};

/// Tolerance used when reporting a route as not fully served.
const UNMET_EPSILON_KWH: f64 = 1e-9;

/// Inclusive interval range a vehicle is available for charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeWindow {
    pub start: usize,
    pub end: usize,
}

impl ChargeWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn of(route: &PlannedRoute) -> Self {
        Self::new(route.return_interval, route.departure_interval)
    }

    /// Number of intervals in the window, or `None` when it is empty
    /// (departure before return).
    pub fn length(&self) -> Option<usize> {
        (self.end >= self.start).then(|| self.end - self.start + 1)
    }
}

/// What scheduling one route did.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    /// Position of the route in the route table.
    pub route_index: usize,
    pub vehicle_id: String,
    pub window: ChargeWindow,
    /// Constant rate written to every charged interval (kW).
    pub rate_kw: f64,
    pub energy_required_kwh: f64,
    pub delivered_kwh: f64,
    /// Number of intervals the route wrote to.
    pub intervals_charged: usize,
    /// `true` when the window was empty and nothing was scheduled.
    pub skipped: bool,
}

impl RouteOutcome {
    /// Energy the route still lacked when its window closed.
    pub fn unmet_kwh(&self) -> f64 {
        (self.energy_required_kwh - self.delivered_kwh).max(0.0)
    }

    pub fn is_unmet(&self) -> bool {
        self.unmet_kwh() > UNMET_EPSILON_KWH
    }
}

/// Charge record of one vehicle over the whole horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSchedule {
    vehicle_id: String,
    max_charge_speed_kw: f64,
    /// `ChargingDemand_kW` per interval.
    demand_kw: Vec<f64>,
    /// `ChargeAmount_kWh` per interval (running cumulative total).
    charge_kwh: Vec<f64>,
}

impl VehicleSchedule {
    /// Empty (all-zero) record for `vehicle`.
    pub fn new(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_id: vehicle.vehicle_id.clone(),
            max_charge_speed_kw: vehicle.max_charge_speed_kw,
            demand_kw: vec![0.0; TOTAL_INTERVALS],
            charge_kwh: vec![0.0; TOTAL_INTERVALS],
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn demand_kw(&self) -> &[f64] {
        &self.demand_kw
    }

    pub fn charge_kwh(&self) -> &[f64] {
        &self.charge_kwh
    }

    /// Schedules one route into this vehicle's record.
    ///
    /// The rate is chosen once by `policy`; intervals are then filled in
    /// order until the required energy has been assigned. Each charged
    /// interval gets the full rate as demand, while the energy it adds may be
    /// smaller on the last charged interval. Intervals after the stopping
    /// point keep whatever an earlier route wrote there.
    ///
    /// An empty window (departure before return) schedules nothing.
    pub fn schedule_route(
        &mut self,
        route_index: usize,
        route: &PlannedRoute,
        policy: ChargePolicy,
    ) -> RouteOutcome {
        let window = ChargeWindow::of(route);
        let energy_required_kwh = route.energy_required_kwh;

        let Some(window_len) = window.length() else {
            return RouteOutcome {
                route_index,
                vehicle_id: self.vehicle_id.clone(),
                window,
                rate_kw: 0.0,
                energy_required_kwh,
                delivered_kwh: 0.0,
                intervals_charged: 0,
                skipped: true,
            };
        };

        let rate_kw = policy.rate_kw(self.max_charge_speed_kw, energy_required_kwh, window_len);
        let per_interval_kwh = rate_kw * INTERVAL_HOURS;

        let mut assigned_kwh = 0.0_f64;
        let mut intervals_charged = 0;
        let last = window.end.min(TOTAL_INTERVALS - 1);
        for i in window.start..=last {
            if assigned_kwh >= energy_required_kwh {
                break;
            }
            let remaining_kwh = energy_required_kwh - assigned_kwh;
            let deliver_kwh = per_interval_kwh.min(remaining_kwh);

            self.demand_kw[i] = rate_kw;
            if i == window.start {
                self.charge_kwh[i] += deliver_kwh;
            } else {
                self.charge_kwh[i] = self.charge_kwh[i - 1] + deliver_kwh;
            }

            assigned_kwh += deliver_kwh;
            intervals_charged += 1;
        }

        RouteOutcome {
            route_index,
            vehicle_id: self.vehicle_id.clone(),
            window,
            rate_kw,
            energy_required_kwh,
            delivered_kwh: assigned_kwh,
            intervals_charged,
            skipped: false,
        }
    }
}

/// Charge records of every vehicle in the fleet, in fleet order.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSchedule {
    vehicles: IndexMap<String, VehicleSchedule>,
}

impl FleetSchedule {
    /// Fresh all-zero records for every vehicle.
    pub fn new(fleet: &Fleet) -> Self {
        let vehicles = fleet
            .iter()
            .map(|v| (v.vehicle_id.clone(), VehicleSchedule::new(v)))
            .collect();
        Self { vehicles }
    }

    /// Schedules one route into its vehicle's record.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownVehicleReference`] if the route's vehicle
    /// has no record.
    pub fn apply_route(
        &mut self,
        route_index: usize,
        route: &PlannedRoute,
        policy: ChargePolicy,
    ) -> Result<RouteOutcome> {
        let schedule = self.vehicles.get_mut(&route.vehicle_id).ok_or_else(|| {
            SimError::UnknownVehicleReference {
                route_index,
                vehicle_id: route.vehicle_id.clone(),
            }
        })?;

        let outcome = schedule.schedule_route(route_index, route, policy);
        if outcome.skipped {
            warn!(
                route = route_index,
                vehicle = %outcome.vehicle_id,
                start = outcome.window.start,
                end = outcome.window.end,
                "departure precedes return, route skipped"
            );
        } else if outcome.is_unmet() {
            warn!(
                route = route_index,
                vehicle = %outcome.vehicle_id,
                %policy,
                unmet_kwh = outcome.unmet_kwh(),
                "charging window too short for required energy"
            );
        } else {
            debug!(
                route = route_index,
                vehicle = %outcome.vehicle_id,
                %policy,
                rate_kw = outcome.rate_kw,
                intervals = outcome.intervals_charged,
                "route scheduled"
            );
        }
        Ok(outcome)
    }

    /// Schedules every route in table order.
    ///
    /// # Errors
    ///
    /// See [`FleetSchedule::apply_route`].
    pub fn apply_all(
        &mut self,
        routes: &[PlannedRoute],
        policy: ChargePolicy,
    ) -> Result<Vec<RouteOutcome>> {
        routes
            .iter()
            .enumerate()
            .map(|(i, route)| self.apply_route(i, route, policy))
            .collect()
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&VehicleSchedule> {
        self.vehicles.get(vehicle_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleSchedule> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
