//! Request handlers for the API endpoints.

use std::io::Cursor;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::warn;

use super::AppState;
use super::types::{
    ErrorResponse, RangeQuery, ResultRow, SimulateResponse, SummaryResponse, rows_in_range,
};
use crate::fleet::PlannedRoute;
use crate::io::export::{ARCHIVE_FILE, write_archive};
use crate::io::ingest::SimulationInputs;
use crate::report::SimulationReport;
use crate::sim::{ChargePolicy, Engine};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse::from(&state.report))
}

/// `GET /routes` → 200 + energy requirements rows
pub async fn get_routes(State(state): State<Arc<AppState>>) -> Json<Vec<PlannedRoute>> {
    Json(state.report.routes.clone())
}

/// Returns result rows of one policy, optionally filtered by interval range.
///
/// `GET /results/spread` → 200 + all 96 rows
/// `GET /results/spread?from=N&to=M` → rows N..=M
/// `GET /results/spread?from=10&to=5` → 400 + `ErrorResponse`
/// `GET /results/bogus` → 404 + `ErrorResponse`
pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(policy): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<ResultRow>>, ApiError> {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("`from` ({from}) must be <= `to` ({to})"),
        ));
    }

    let policy: ChargePolicy = policy
        .parse()
        .map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))?;
    let report = state.report.policy(policy).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("policy \"{policy}\" was not part of this run"),
        )
    })?;

    Ok(Json(rows_in_range(&report.table, from, to)))
}

/// `GET /archive` → 200 + `simulation_results.zip` with every table of the run
pub async fn get_archive(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = write_archive(&state.report, Cursor::new(Vec::new()))
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .into_inner();

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_FILE}\""),
            ),
        ],
        bytes,
    ))
}

/// Runs both policies on the uploaded tables.
///
/// `POST /simulate` with `SimulationInputs` JSON → 200 + `SimulateResponse`
/// Malformed body → rejection status + `ErrorResponse`
/// Invalid inputs → 422 + `ErrorResponse`
pub async fn post_simulate(
    body: Result<Json<SimulationInputs>, JsonRejection>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let Json(inputs) = body.map_err(|rejection| api_error(rejection.status(), rejection.body_text()))?;

    let run = Engine::new(&inputs)
        .and_then(|engine| engine.run(&ChargePolicy::ALL))
        .map_err(|e| {
            warn!(error = %e, "simulation request rejected");
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    Ok(Json(SimulateResponse::from(&SimulationReport::from_run(&run))))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::fleet::{RouteRecord, Vehicle};

    fn inputs() -> SimulationInputs {
        SimulationInputs {
            vehicles: vec![Vehicle::new("1", 50.0, 1.0), Vehicle::new("2", 11.0, 0.5)],
            routes: vec![
                RouteRecord::new("1", 100.0, "18:00", "06:00"),
                RouteRecord::new("2", 40.0, "19:30", "05:00"),
            ],
            base_load_kw: vec![10.0; 24],
        }
    }

    fn make_test_state() -> Arc<AppState> {
        let run = Engine::new(&inputs())
            .and_then(|e| e.run(&ChargePolicy::ALL))
            .expect("valid inputs");
        Arc::new(AppState {
            report: SimulationReport::from_run(&run),
        })
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn summary_returns_200() {
        let (status, json) = get("/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["vehicles"], 2);
        assert_eq!(json["routes"], 2);
        assert_eq!(json["kpis"].as_array().map(Vec::len), Some(2));
        assert!(json["comparison"].is_object());
    }

    #[tokio::test]
    async fn routes_use_csv_column_names() {
        let (status, json) = get("/routes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["VehicleID"], "1");
        assert_eq!(json[0]["EnergyRequired_kWh"], 100.0);
        assert_eq!(json[1]["ReturnInterval"], 39);
    }

    #[tokio::test]
    async fn results_range_query() {
        let (status, json) = get("/results/spread?from=36&to=40").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["IntervalIndex"], 36);
        assert_eq!(rows[0]["TimeOfDay"], "18:00");
        assert_eq!(rows[0]["ChargingDemand_Vehicle1_kW"], 8.0);
    }

    #[tokio::test]
    async fn results_invalid_range_returns_400() {
        let (status, json) = get("/results/frontload?from=10&to=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn unknown_policy_returns_404() {
        let (status, json) = get("/results/balanced").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn archive_is_a_zip_download() {
        let app = router(make_test_state());
        let req = Request::builder().uri("/archive").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/zip");

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
        assert_eq!(archive.len(), 3);
        assert!(archive.file_names().any(|n| n == "energy_requirements.csv"));
    }

    async fn post(body: String) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/simulate")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn simulate_runs_both_policies() {
        let (status, json) = post(serde_json::to_string(&inputs()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"]["spread"].as_array().map(Vec::len), Some(96));
        assert_eq!(json["results"]["frontload"].as_array().map(Vec::len), Some(96));
        assert_eq!(json["energy_requirements"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn simulate_unknown_vehicle_returns_422() {
        let mut bad = inputs();
        bad.routes.push(RouteRecord::new("ghost", 5.0, "18:00", "06:00"));
        let (status, json) = post(serde_json::to_string(&bad).unwrap()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn simulate_bad_time_returns_422() {
        let mut bad = inputs();
        bad.routes[0].return_time = "noon".to_string();
        let (status, json) = post(serde_json::to_string(&bad).unwrap()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn simulate_malformed_body_returns_error_json() {
        let (status, json) = post("{not json".to_string()).await;
        assert!(status.is_client_error());
        assert!(json.get("error").is_some());
    }
}
