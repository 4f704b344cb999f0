use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    db::with_tx,
    error::ApiError,
    monitoring::{
        dto::{SaveMonitoringRequest, SavedMonitoringResponse},
        repo::{self, MonitoringRecord, MonitoringWithPatient},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/monitoring", get(list_all).post(save))
        .route("/monitoring/save", post(save))
        .route("/monitoring/me", get(list_mine))
        .route("/monitoring/:id", delete(delete_record))
}

#[instrument(skip(state))]
async fn list_all(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
) -> Result<Json<Vec<MonitoringWithPatient>>, ApiError> {
    tracing::debug!(caller_id, "listing all monitoring records");
    let records = with_tx(&state.db, |conn| Box::pin(repo::list_all(conn))).await?;
    Ok(Json(records))
}

/// The record's owner is the verified token subject; the body carries only
/// the measurements.
#[instrument(skip(state, payload))]
async fn save(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveMonitoringRequest>,
) -> Result<(StatusCode, Json<SavedMonitoringResponse>), ApiError> {
    let (glucose_level, heart_rate) = match (payload.glucose_level, payload.heart_rate) {
        (Some(g), Some(h)) => (g, h),
        _ => {
            return Err(ApiError::Validation(
                "glucose_level and heart_rate are required".into(),
            ))
        }
    };

    let id = with_tx(&state.db, move |conn| {
        Box::pin(repo::insert(conn, user_id, glucose_level, heart_rate))
    })
    .await?;

    info!(user_id, record_id = id, "monitoring record saved");
    Ok((
        StatusCode::CREATED,
        Json(SavedMonitoringResponse {
            message: "monitoring record saved".into(),
            id,
        }),
    ))
}

#[instrument(skip(state))]
async fn list_mine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MonitoringRecord>>, ApiError> {
    let records = with_tx(&state.db, move |conn| {
        Box::pin(repo::list_for_user(conn, user_id))
    })
    .await?;
    Ok(Json(records))
}

/// Deletes by id for any authenticated caller; the record's owner is not
/// compared against the token subject.
#[instrument(skip(state))]
async fn delete_record(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(record_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let affected = with_tx(&state.db, move |conn| {
        Box::pin(repo::delete(conn, record_id))
    })
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound("monitoring record not found".into()));
    }
    info!(record_id, caller_id, "monitoring record deleted");
    Ok(Json(json!({ "message": "monitoring record deleted" })))
}
