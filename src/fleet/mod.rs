//! Fleet and route tables, and the route energy model.

/// Route records and their resolved charging windows.
pub mod route;
/// Seeded synthetic fleet generation.
pub mod synthetic;
pub mod vehicle;

pub use route::{PlannedRoute, RouteRecord, plan_route, plan_routes};
pub use synthetic::SyntheticFleet;
pub use vehicle::{Fleet, Vehicle, canonical_vehicle_id};
