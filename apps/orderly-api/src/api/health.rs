use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::services::HealthReport;
use crate::AppState;

/// `GET /health`; 503 when the database is unreachable.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;

    let status = if report.is_serving() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}
