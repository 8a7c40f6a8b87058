//! REST API over a completed run.
//!
//! Provides:
//! - `GET /summary`: fleet size, route count, KPIs per policy and the comparison
//! - `GET /routes`: the energy requirements table
//! - `GET /results/{policy}`: result table rows with optional interval filtering
//! - `GET /archive`: every table of the run as `simulation_results.zip`
//! - `POST /simulate`: runs both policies on uploaded tables

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::report::SimulationReport;

pub use types::{ErrorResponse, ResultRow, SimulateResponse, SummaryResponse};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the startup run completes and wrapped in `Arc`.
/// `POST /simulate` builds its own run and never touches this state.
pub struct AppState {
    pub report: SimulationReport,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/routes", get(handlers::get_routes))
        .route("/results/{policy}", get(handlers::get_results))
        .route("/archive", get(handlers::get_archive))
        .route("/simulate", post(handlers::post_simulate))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns the bind or serve error.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
