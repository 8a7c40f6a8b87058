//! API response and query types.
//!
//! Result rows use the CSV column names as keys so JSON and CSV consumers
//! see the same schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::fleet::PlannedRoute;
use crate::report::{Cell, ResultTable, SimulationReport};
use crate::sim::{KpiReport, PolicyComparison};

/// One result table row keyed by column name, in column order.
pub type ResultRow = IndexMap<String, Cell>;

/// Fleet size, route count and KPIs of a run.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub vehicles: usize,
    pub routes: usize,
    /// One report per policy, in run order.
    pub kpis: Vec<KpiReport>,
    pub comparison: Option<PolicyComparison>,
}

impl From<&SimulationReport> for SummaryResponse {
    fn from(report: &SimulationReport) -> Self {
        Self {
            vehicles: report.vehicles,
            routes: report.routes.len(),
            kpis: report.policies.iter().map(|p| p.kpi.clone()).collect(),
            comparison: report.comparison.clone(),
        }
    }
}

/// Everything `POST /simulate` computed.
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    #[serde(flatten)]
    pub summary: SummaryResponse,
    /// Energy requirements rows.
    pub energy_requirements: Vec<PlannedRoute>,
    /// Result rows keyed by policy name.
    pub results: IndexMap<String, Vec<ResultRow>>,
}

impl From<&SimulationReport> for SimulateResponse {
    fn from(report: &SimulationReport) -> Self {
        Self {
            summary: SummaryResponse::from(report),
            energy_requirements: report.routes.clone(),
            results: report
                .policies
                .iter()
                .map(|p| (p.policy.to_string(), rows_in_range(&p.table, 0, usize::MAX)))
                .collect(),
        }
    }
}

/// Rows whose `IntervalIndex` lies in `from..=to`.
pub fn rows_in_range(table: &ResultTable, from: usize, to: usize) -> Vec<ResultRow> {
    let last = table.len().saturating_sub(1).min(to);
    (from..=last).filter_map(|i| table.row_map(i)).collect()
}

/// Optional interval range for the results endpoint.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// First interval (inclusive).
    pub from: Option<usize>,
    /// Last interval (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{RouteRecord, Vehicle};
    use crate::io::ingest::SimulationInputs;
    use crate::sim::{ChargePolicy, Engine};

    fn report() -> SimulationReport {
        let inputs = SimulationInputs {
            vehicles: vec![Vehicle::new("1", 22.0, 1.0)],
            routes: vec![RouteRecord::new("1", 40.0, "20:00", "04:00")],
            base_load_kw: vec![3.0],
        };
        let run = Engine::new(&inputs)
            .and_then(|e| e.run(&ChargePolicy::ALL))
            .expect("valid inputs");
        SimulationReport::from_run(&run)
    }

    #[test]
    fn range_is_clipped_to_table() {
        let report = report();
        let table = &report.policies[0].table;
        assert_eq!(rows_in_range(table, 90, 500).len(), 6);
        assert_eq!(rows_in_range(table, 10, 10).len(), 1);
        assert!(rows_in_range(table, 200, 300).is_empty());
    }

    #[test]
    fn simulate_response_groups_rows_by_policy() {
        let response = SimulateResponse::from(&report());
        assert_eq!(response.summary.vehicles, 1);
        assert_eq!(response.summary.kpis.len(), 2);
        let keys: Vec<&str> = response.results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["spread", "frontload"]);
        assert_eq!(response.results["spread"].len(), 96);
    }
}
