//! Tabular results: one wide table per policy pass plus the run summary.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::fleet::PlannedRoute;
use crate::grid::time_of_day_label;
use crate::sim::{ChargePolicy, KpiReport, PolicyComparison, PolicyRun, SimulationRun};

/// Decimal places kept in every float column.
const DECIMALS: i32 = 2;

/// Rounds half to even at `decimals` places.
///
/// ```
/// use fleet_charge_sim::report::round_to;
///
/// assert_eq!(round_to(0.125, 2), 0.12);
/// assert_eq!(round_to(2.675, 2), 2.67);
/// assert_eq!(round_to(8.0, 2), 8.0);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Index(Vec<usize>),
    Label(Vec<String>),
    Float(Vec<f64>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Index(v) => v.len(),
            ColumnData::Label(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    fn cell(&self, row: usize) -> Option<Cell> {
        match self {
            ColumnData::Index(v) => v.get(row).copied().map(Cell::Index),
            ColumnData::Label(v) => v.get(row).cloned().map(Cell::Label),
            ColumnData::Float(v) => v.get(row).copied().map(Cell::Float),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    fn float(name: impl Into<String>, values: &[f64]) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Float(values.iter().map(|v| round_to(*v, DECIMALS)).collect()),
        }
    }
}

/// A single table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Index(usize),
    Label(String),
    Float(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Index(i) => write!(f, "{i}"),
            Cell::Label(s) => f.write_str(s),
            // shortest round-trip form, always with a fractional part
            Cell::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// Per-interval results of one policy pass.
///
/// Columns, in order: `IntervalIndex`, `TimeOfDay`, `BaseLoad_kW`, then for
/// each vehicle in fleet order `ChargingDemand_Vehicle{id}_kW` and
/// `ChargeAmount_Vehicle{id}_kWh`, then `Total_EV_Demand_kW` and
/// `Total_Demand_kW`. Float columns are rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub policy: ChargePolicy,
    columns: Vec<Column>,
}

impl ResultTable {
    pub fn from_policy_run(run: &PolicyRun) -> Self {
        let rows = run.demand.total_demand_kw.len();
        let mut columns = Vec::with_capacity(5 + 2 * run.schedule.len());

        columns.push(Column {
            name: "IntervalIndex".to_string(),
            data: ColumnData::Index((0..rows).collect()),
        });
        columns.push(Column {
            name: "TimeOfDay".to_string(),
            data: ColumnData::Label((0..rows).map(time_of_day_label).collect()),
        });
        columns.push(Column::float("BaseLoad_kW", &run.demand.base_load_kw));

        for vehicle in run.schedule.iter() {
            let id = vehicle.vehicle_id();
            columns.push(Column::float(
                format!("ChargingDemand_Vehicle{id}_kW"),
                vehicle.demand_kw(),
            ));
            columns.push(Column::float(
                format!("ChargeAmount_Vehicle{id}_kWh"),
                vehicle.charge_kwh(),
            ));
        }

        columns.push(Column::float(
            "Total_EV_Demand_kW",
            &run.demand.total_ev_demand_kw,
        ));
        columns.push(Column::float("Total_Demand_kW", &run.demand.total_demand_kw));

        Self {
            policy: run.policy,
            columns,
        }
    }

    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of a float column, if `name` is one.
    pub fn floats(&self, name: &str) -> Option<&[f64]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Float(values)) => Some(values),
            _ => None,
        }
    }

    /// Number of rows (intervals).
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells of row `row` in column order.
    pub fn row(&self, row: usize) -> Option<Vec<Cell>> {
        self.columns.iter().map(|c| c.data.cell(row)).collect()
    }

    /// Row `row` keyed by column name, in column order.
    pub fn row_map(&self, row: usize) -> Option<IndexMap<String, Cell>> {
        self.columns
            .iter()
            .map(|c| c.data.cell(row).map(|cell| (c.name.clone(), cell)))
            .collect()
    }
}

/// Results of one policy: its table and KPIs.
#[derive(Debug, Clone)]
pub struct PolicyReport {
    pub policy: ChargePolicy,
    pub table: ResultTable,
    pub kpi: KpiReport,
}

/// Everything a completed run publishes.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub vehicles: usize,
    /// Energy requirements table rows.
    pub routes: Vec<PlannedRoute>,
    pub policies: Vec<PolicyReport>,
    /// Present when both policies were run.
    pub comparison: Option<PolicyComparison>,
}

impl SimulationReport {
    pub fn from_run(run: &SimulationRun) -> Self {
        let policies: Vec<PolicyReport> = run
            .passes
            .iter()
            .map(|pass| PolicyReport {
                policy: pass.policy,
                table: ResultTable::from_policy_run(pass),
                kpi: KpiReport::from_run(pass),
            })
            .collect();

        let kpi_of = |policy: ChargePolicy| {
            policies
                .iter()
                .find(|p| p.policy == policy)
                .map(|p| &p.kpi)
        };
        let comparison = match (kpi_of(ChargePolicy::Spread), kpi_of(ChargePolicy::Frontload)) {
            (Some(managed), Some(unmanaged)) => Some(PolicyComparison::new(managed, unmanaged)),
            _ => None,
        };

        Self {
            vehicles: run.vehicles,
            routes: run.routes.clone(),
            policies,
            comparison,
        }
    }

    pub fn policy(&self, policy: ChargePolicy) -> Option<&PolicyReport> {
        self.policies.iter().find(|p| p.policy == policy)
    }
}
