use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    db::with_tx,
    error::ApiError,
    sensors::{
        dto::{assemble_latest, BatchUpdateRequest, LatestSensorValues, SingleUpdateRequest},
        repo,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sensors/update", patch(update_batch))
        .route("/sensors/latest", get(latest))
        .route("/sensors/:id", patch(update_one))
}

/// Overwrites both slots in one statement. Fewer than 2 affected rows is a
/// degraded success reported as a warning, not an error.
#[instrument(skip(state, payload))]
async fn update_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let (glucose, heart_rate) = match (payload.glucose, payload.heart_rate) {
        (Some(g), Some(h)) => (g, h),
        _ => {
            return Err(ApiError::Validation(
                "payload must contain 'glucose' and 'heart_rate'".into(),
            ))
        }
    };

    let affected = with_tx(&state.db, move |conn| {
        Box::pin(repo::update_batch(conn, glucose, heart_rate))
    })
    .await?;

    if affected < 2 {
        warn!(affected, "sensor batch update touched fewer rows than expected");
        return Ok(Json(json!({
            "warning": format!("only {affected} sensors were updated")
        })));
    }
    Ok(Json(json!({ "message": "both sensor values updated" })))
}

#[instrument(skip(state, payload))]
async fn update_one(
    State(state): State<AppState>,
    Path(sensor_id): Path<i64>,
    Json(payload): Json<SingleUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(value) = payload.value else {
        return Err(ApiError::Validation("payload must contain 'value'".into()));
    };

    let affected = with_tx(&state.db, move |conn| {
        Box::pin(repo::update_one(conn, sensor_id, value))
    })
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound(format!(
            "sensor with id {sensor_id} not found"
        )));
    }
    info!(sensor_id, value, "sensor value updated");
    Ok(Json(json!({
        "message": format!("sensor {sensor_id} value updated")
    })))
}

#[instrument(skip(state))]
async fn latest(State(state): State<AppState>) -> Result<Json<LatestSensorValues>, ApiError> {
    let rows = with_tx(&state.db, |conn| Box::pin(repo::read_current(conn))).await?;
    Ok(Json(assemble_latest(&rows)))
}
