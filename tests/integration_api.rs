//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use fleet_charge_sim::api::{AppState, router};
use fleet_charge_sim::config::SyntheticConfig;
use fleet_charge_sim::fleet::SyntheticFleet;
use fleet_charge_sim::report::SimulationReport;

/// Runs the default synthetic depot and returns the API state.
fn build_api_state() -> Arc<AppState> {
    let inputs = SyntheticFleet::generate(&SyntheticConfig::default());
    let run = common::run_both(&inputs);
    Arc::new(AppState {
        report: SimulationReport::from_run(&run),
    })
}

async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn full_run_summary_endpoint() {
    let (status, json) = send(get("/summary")).await;
    assert_eq!(status, StatusCode::OK);

    let defaults = SyntheticConfig::default();
    assert_eq!(json["vehicles"], defaults.vehicles);
    assert_eq!(json["routes"], defaults.vehicles * defaults.routes_per_vehicle);

    let kpis = json["kpis"].as_array().unwrap();
    assert_eq!(kpis[0]["policy"], "spread");
    assert_eq!(kpis[1]["policy"], "frontload");
    assert!(kpis[1]["peak_total_demand_kw"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn results_rows_match_columns() {
    let (status, json) = send(get("/results/frontload")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 96);
    for (i, row) in rows.iter().enumerate() {
        let total = row["Total_Demand_kW"].as_f64().unwrap();
        let base = row["BaseLoad_kW"].as_f64().unwrap();
        let ev = row["Total_EV_Demand_kW"].as_f64().unwrap();
        assert_eq!(row["IntervalIndex"], i);
        // columns are rounded independently
        assert!((total - (base + ev)).abs() <= 0.02, "row {i}");
    }
}

#[tokio::test]
async fn results_support_policy_aliases() {
    let (status, json) = send(get("/results/managed?from=95")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn simulate_rejects_empty_baseline() {
    let body = r#"{"vehicles":[{"VehicleID":"1","MaxChargeSpeed_kW":50,"Efficiency_kWh_km":1}],
                   "routes":[{"VehicleID":"1","RouteLength_km":10,"ReturnTime":"18:00","DepartureTime":"06:00"}],
                   "base_load_kw":[]}"#;
    let req = Request::builder()
        .method("POST")
        .uri("/simulate")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send(req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("baseline"));
}
