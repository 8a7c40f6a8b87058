/// Fleet demand aggregation.
pub mod aggregate;
pub mod engine;
pub mod kpi;
/// Charging policies.
pub mod policy;
pub mod scheduler;

pub use aggregate::{DemandSeries, aggregate};
pub use engine::{Engine, PolicyRun, SimulationRun};
pub use kpi::{KpiReport, PolicyComparison};
pub use policy::ChargePolicy;
pub use scheduler::{ChargeWindow, FleetSchedule, RouteOutcome, VehicleSchedule};
