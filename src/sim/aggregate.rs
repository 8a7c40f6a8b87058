//! Fleet-level demand aggregation.

use super::scheduler::FleetSchedule;
use crate::baseline::BaselineLoad;
use crate::grid::TOTAL_INTERVALS;

/// Per-interval demand series for one policy pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandSeries {
    /// `BaseLoad_kW`
    pub base_load_kw: Vec<f64>,
    /// `Total_EV_Demand_kW`: sum of every vehicle's charging demand.
    pub total_ev_demand_kw: Vec<f64>,
    /// `Total_Demand_kW`: base load plus fleet EV demand.
    pub total_demand_kw: Vec<f64>,
}

/// Sums vehicle demand and adds it to the base load.
///
/// Must run after every route has been scheduled. Vehicles are summed in
/// fleet order, so the result is reproducible bit for bit.
pub fn aggregate(baseline: &BaselineLoad, schedule: &FleetSchedule) -> DemandSeries {
    let mut total_ev_demand_kw = vec![0.0_f64; TOTAL_INTERVALS];
    for vehicle in schedule.iter() {
        for (total, kw) in total_ev_demand_kw.iter_mut().zip(vehicle.demand_kw()) {
            *total += kw;
        }
    }

    let base_load_kw = baseline.as_slice().to_vec();
    let total_demand_kw = base_load_kw
        .iter()
        .zip(&total_ev_demand_kw)
        .map(|(base, ev)| base + ev)
        .collect();

    DemandSeries {
        base_load_kw,
        total_ev_demand_kw,
        total_demand_kw,
    }
}
