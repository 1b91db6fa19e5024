use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use ppecheck_application::InspectionOutcome;
use tracing::{info, warn};

use crate::dto::{HealthResponse, InvocationResponse, StorageObjectEvent};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn inspect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<InvocationResponse>)> {
    let event = StorageObjectEvent::decode(&headers, &body).inspect_err(|error| {
        warn!(error = %error, "rejected malformed storage event");
    })?;
    info!(
        event_id = event.context.id.as_deref().unwrap_or("-"),
        event_type = event.context.event_type.as_deref().unwrap_or("-"),
        source = event.context.source.as_deref().unwrap_or("-"),
        bucket = %event.data.bucket,
        name = %event.data.name,
        "storage event received"
    );

    let request = event.into_request()?;

    match state.inspection_service.inspect(request).await {
        InspectionOutcome::Completed(report) => Ok((
            StatusCode::OK,
            Json(InvocationResponse::Result(*report.record.verdicts())),
        )),
        InspectionOutcome::Failed(failure) => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(InvocationResponse::Error(failure.error.to_string())),
        )),
    }
}
