//! Simulation engine: prepares inputs once and runs one pass per policy.

use tracing::{info, info_span};

use super::aggregate::{DemandSeries, aggregate};
use super::policy::ChargePolicy;
use super::scheduler::{FleetSchedule, RouteOutcome};
use crate::baseline::BaselineLoad;
use crate::error::Result;
use crate::fleet::{Fleet, PlannedRoute, plan_routes};
use crate::io::ingest::SimulationInputs;

/// Everything one policy pass produced.
#[derive(Debug, Clone)]
pub struct PolicyRun {
    pub policy: ChargePolicy,
    /// Per-vehicle charge records after all routes were applied.
    pub schedule: FleetSchedule,
    pub demand: DemandSeries,
    /// One outcome per route, in route-table order.
    pub outcomes: Vec<RouteOutcome>,
}

/// Result of a complete run across the requested policies.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// Number of vehicles in the fleet table.
    pub vehicles: usize,
    /// Routes with resolved windows and energy requirements.
    pub routes: Vec<PlannedRoute>,
    /// Policy passes in the order they were requested.
    pub passes: Vec<PolicyRun>,
}

impl SimulationRun {
    pub fn pass(&self, policy: ChargePolicy) -> Option<&PolicyRun> {
        self.passes.iter().find(|p| p.policy == policy)
    }
}

/// Validated, planned inputs shared by every policy pass.
///
/// Passes never mutate the engine, so running the same policy twice yields
/// identical results.
#[derive(Debug, Clone)]
pub struct Engine {
    fleet: Fleet,
    routes: Vec<PlannedRoute>,
    baseline: BaselineLoad,
}

impl Engine {
    /// Validates the inputs, builds the fleet table, plans every route and
    /// fits the baseline to the grid.
    ///
    /// # Errors
    ///
    /// Returns the first validation, planning or baseline error.
    pub fn new(inputs: &SimulationInputs) -> Result<Self> {
        inputs.validate()?;

        let fleet = Fleet::new(inputs.vehicles.iter().cloned())?;
        let routes = plan_routes(&inputs.routes, &fleet)?;
        let baseline = BaselineLoad::resample(&inputs.base_load_kw)?;

        info!(
            vehicles = fleet.len(),
            routes = routes.len(),
            baseline_points = inputs.base_load_kw.len(),
            "simulation inputs prepared"
        );

        Ok(Self {
            fleet,
            routes,
            baseline,
        })
    }

    /// Runs one policy pass on a fresh set of charge records.
    ///
    /// # Errors
    ///
    /// Propagates scheduling errors; none occur for routes planned by
    /// [`Engine::new`].
    pub fn run_policy(&self, policy: ChargePolicy) -> Result<PolicyRun> {
        let _span = info_span!("policy_pass", %policy).entered();

        let mut schedule = FleetSchedule::new(&self.fleet);
        let outcomes = schedule.apply_all(&self.routes, policy)?;
        let demand = aggregate(&self.baseline, &schedule);

        let peak_kw = demand
            .total_demand_kw
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let unmet = outcomes.iter().filter(|o| o.is_unmet()).count();
        info!(peak_total_kw = peak_kw, unmet_routes = unmet, "policy pass complete");

        Ok(PolicyRun {
            policy,
            schedule,
            demand,
            outcomes,
        })
    }

    /// Runs every policy in `policies`, in order.
    ///
    /// # Errors
    ///
    /// Aborts on the first failing pass; no partial run is returned.
    pub fn run(&self, policies: &[ChargePolicy]) -> Result<SimulationRun> {
        let passes = policies
            .iter()
            .map(|&policy| self.run_policy(policy))
            .collect::<Result<Vec<_>>>()?;

        Ok(SimulationRun {
            vehicles: self.fleet.len(),
            routes: self.routes.clone(),
            passes,
        })
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn routes(&self) -> &[PlannedRoute] {
        &self.routes
    }

    pub fn baseline(&self) -> &BaselineLoad {
        &self.baseline
    }
}
