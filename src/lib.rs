//! Depot EV fleet charging simulator.
//!
//! Plans each route's charging window on a 48-hour half-hour grid, schedules
//! charging under a managed (`spread`) and an unmanaged (`frontload`) policy,
//! and aggregates fleet demand on top of the site's baseline load.

#[cfg(feature = "api")]
pub mod api;
pub mod baseline;
pub mod config;
pub mod error;
/// Vehicles, routes and the synthetic fleet generator.
pub mod fleet;
pub mod grid;
pub mod io;
pub mod logging;
pub mod report;
/// Scheduling, aggregation, engine and KPI modules.
pub mod sim;

pub use error::{Result, SimError};
