//! Post-hoc KPI computation from policy passes.

use std::fmt;

use serde::Serialize;

use super::engine::PolicyRun;
use super::policy::ChargePolicy;
use crate::grid::time_of_day_label;

/// Aggregate indicators of one policy pass.
///
/// Computed after the pass from its demand series and route outcomes, so the
/// report always agrees with the exported tables.
#[derive(Debug, Clone, Serialize)]
pub struct KpiReport {
    pub policy: ChargePolicy,
    /// Highest total (base + EV) demand (kW).
    pub peak_total_demand_kw: f64,
    /// Interval at which the total peak first occurs.
    pub peak_interval: usize,
    /// Time-of-day label of `peak_interval`.
    pub peak_time: String,
    /// Highest fleet EV demand (kW).
    pub peak_ev_demand_kw: f64,
    /// Mean total demand over the horizon (kW).
    pub mean_total_demand_kw: f64,
    /// Sum of route energy requirements (kWh).
    pub energy_required_kwh: f64,
    /// Energy assigned by the scheduler (kWh).
    pub energy_delivered_kwh: f64,
    /// Requirement left unserved when windows closed (kWh).
    pub energy_unmet_kwh: f64,
    /// Routes skipped because departure preceded return.
    pub routes_skipped: usize,
    /// Routes whose requirement was not fully served.
    pub routes_unmet: usize,
}

impl KpiReport {
    pub fn from_run(run: &PolicyRun) -> Self {
        let total = &run.demand.total_demand_kw;

        let (peak_interval, peak_total_demand_kw) = total
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, kw)| {
                if kw > best.1 { (i, kw) } else { best }
            });
        let peak_total_demand_kw = if total.is_empty() {
            0.0
        } else {
            peak_total_demand_kw
        };

        let peak_ev_demand_kw = run
            .demand
            .total_ev_demand_kw
            .iter()
            .copied()
            .fold(0.0_f64, f64::max);

        let mean_total_demand_kw = if total.is_empty() {
            0.0
        } else {
            total.iter().sum::<f64>() / total.len() as f64
        };

        let mut energy_required_kwh = 0.0;
        let mut energy_delivered_kwh = 0.0;
        let mut energy_unmet_kwh = 0.0;
        let mut routes_skipped = 0;
        let mut routes_unmet = 0;
        for outcome in &run.outcomes {
            energy_required_kwh += outcome.energy_required_kwh;
            energy_delivered_kwh += outcome.delivered_kwh;
            energy_unmet_kwh += outcome.unmet_kwh();
            if outcome.skipped {
                routes_skipped += 1;
            } else if outcome.is_unmet() {
                routes_unmet += 1;
            }
        }

        Self {
            policy: run.policy,
            peak_total_demand_kw,
            peak_interval,
            peak_time: time_of_day_label(peak_interval),
            peak_ev_demand_kw,
            mean_total_demand_kw,
            energy_required_kwh,
            energy_delivered_kwh,
            energy_unmet_kwh,
            routes_skipped,
            routes_unmet,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ({}) ---", self.policy)?;
        writeln!(
            f,
            "Peak total demand:     {:.2} kW (interval {}, {})",
            self.peak_total_demand_kw, self.peak_interval, self.peak_time
        )?;
        writeln!(f, "Peak EV demand:        {:.2} kW", self.peak_ev_demand_kw)?;
        writeln!(f, "Mean total demand:     {:.2} kW", self.mean_total_demand_kw)?;
        writeln!(
            f,
            "EV energy delivered:   {:.2} / {:.2} kWh",
            self.energy_delivered_kwh, self.energy_required_kwh
        )?;
        writeln!(f, "Unmet energy:          {:.2} kWh", self.energy_unmet_kwh)?;
        write!(
            f,
            "Routes skipped/unmet:  {}/{}",
            self.routes_skipped, self.routes_unmet
        )
    }
}

/// Peak comparison between managed and unmanaged charging.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyComparison {
    pub managed_peak_kw: f64,
    pub unmanaged_peak_kw: f64,
    /// `unmanaged_peak_kw - managed_peak_kw`
    pub peak_reduction_kw: f64,
    /// Reduction relative to the unmanaged peak, in percent.
    pub peak_reduction_pct: f64,
}

impl PolicyComparison {
    pub fn new(managed: &KpiReport, unmanaged: &KpiReport) -> Self {
        let peak_reduction_kw = unmanaged.peak_total_demand_kw - managed.peak_total_demand_kw;
        let peak_reduction_pct = if unmanaged.peak_total_demand_kw > 0.0 {
            100.0 * peak_reduction_kw / unmanaged.peak_total_demand_kw
        } else {
            0.0
        };

        Self {
            managed_peak_kw: managed.peak_total_demand_kw,
            unmanaged_peak_kw: unmanaged.peak_total_demand_kw,
            peak_reduction_kw,
            peak_reduction_pct,
        }
    }
}

impl fmt::Display for PolicyComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Charge Management Comparison ---")?;
        writeln!(f, "Peak with management:    {:.2} kW", self.managed_peak_kw)?;
        writeln!(f, "Peak without management: {:.2} kW", self.unmanaged_peak_kw)?;
        write!(
            f,
            "Peak reduction:          {:.2} kW ({:.1}%)",
            self.peak_reduction_kw, self.peak_reduction_pct
        )
    }
}
