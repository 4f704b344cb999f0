use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    db::with_tx,
    error::ApiError,
    faq::{
        dto::{CreatedFaqResponse, FaqPayload},
        repo::{self, FaqEntry},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/faq", get(list_faqs).post(create_faq))
        .route("/faq/:id", put(update_faq).delete(delete_faq))
}

#[instrument(skip(state))]
async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<FaqEntry>>, ApiError> {
    let faqs = with_tx(&state.db, |conn| Box::pin(repo::list(conn))).await?;
    Ok(Json(faqs))
}

#[instrument(skip(state, payload))]
async fn create_faq(
    State(state): State<AppState>,
    Json(payload): Json<FaqPayload>,
) -> Result<(StatusCode, Json<CreatedFaqResponse>), ApiError> {
    let Some((judul, deskripsi)) = payload.complete() else {
        return Err(ApiError::Validation(
            "judul and deskripsi are required".into(),
        ));
    };

    let id = with_tx(&state.db, move |conn| {
        Box::pin(async move { repo::insert(conn, &judul, &deskripsi).await })
    })
    .await?;

    info!(faq_id = id, "faq entry created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedFaqResponse {
            message: "faq entry created".into(),
            id,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn update_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<i64>,
    Json(payload): Json<FaqPayload>,
) -> Result<Json<Value>, ApiError> {
    let Some((judul, deskripsi)) = payload.complete() else {
        return Err(ApiError::Validation(
            "judul and deskripsi are required".into(),
        ));
    };

    let affected = with_tx(&state.db, move |conn| {
        Box::pin(async move { repo::update(conn, faq_id, &judul, &deskripsi).await })
    })
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound("faq entry not found".into()));
    }
    info!(faq_id, "faq entry updated");
    Ok(Json(json!({ "message": "faq entry updated" })))
}

#[instrument(skip(state))]
async fn delete_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let affected = with_tx(&state.db, move |conn| {
        Box::pin(repo::delete(conn, faq_id))
    })
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound("faq entry not found".into()));
    }
    info!(faq_id, "faq entry deleted");
    Ok(Json(json!({ "message": "faq entry deleted" })))
}
