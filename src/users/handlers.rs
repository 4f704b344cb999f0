use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{handlers::is_valid_email, password::hash_password, AuthUser},
    db::with_tx,
    error::ApiError,
    state::AppState,
    users::{
        dto::{is_valid_role, CreateUserRequest, CreatedUserResponse, UpdateUserRequest},
        repo::{self, NewUser, Patient, User, UserChanges},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/patients", get(list_patients))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    tracing::debug!(caller_id, "listing all users");
    let users = with_tx(&state.db, |conn| Box::pin(repo::list(conn))).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    tracing::debug!(caller_id, user_id, "fetching user");
    let user = with_tx(&state.db, move |conn| {
        Box::pin(repo::find_by_id(conn, user_id))
    })
    .await?;
    user.map(Json)
        .ok_or_else(|| ApiError::NotFound("user not found".into()))
}

/// Registration. Public: this is how accounts come to exist.
#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), ApiError> {
    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(%email, "registration with invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    let role = payload.role.unwrap_or_default();
    if !is_valid_role(&role) {
        return Err(ApiError::Validation(
            "role must be one of patient, admin, other".into(),
        ));
    }

    let password_hash = hash_password(&payload.password.unwrap_or_default())?;
    let new_user = NewUser {
        name: payload.name.unwrap_or_default(),
        age: payload.age,
        email,
        gender: payload.gender,
        address: payload.address,
        password_hash,
        role,
    };

    let created = with_tx(&state.db, move |conn| {
        Box::pin(async move {
            // The unique index still backs this up; the pre-check just gives
            // a friendlier answer for the common case.
            if repo::find_by_email_for_login(conn, &new_user.email)
                .await?
                .is_some()
            {
                return Ok(None);
            }
            repo::insert(conn, &new_user).await.map(Some)
        })
    })
    .await?;

    match created {
        Some(id) => {
            info!(user_id = id, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(CreatedUserResponse {
                    message: "user registered successfully".into(),
                    id,
                }),
            ))
        }
        None => Err(ApiError::Conflict {
            message: "email already exists".into(),
            detail: None,
        }),
    }
}

enum UpdateOutcome {
    NotFound,
    EmailInUse,
    Done,
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation(
            "request body is empty or has no fields to update".into(),
        ));
    }
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email.trim()) {
            return Err(ApiError::Validation("invalid email".into()));
        }
    }
    if let Some(role) = payload.role.as_deref() {
        if !is_valid_role(role) {
            return Err(ApiError::Validation(
                "role must be one of patient, admin, other".into(),
            ));
        }
    }
    let password_hash = match payload.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash_password(p)?),
        _ => None,
    };
    let changes = UserChanges {
        name: payload.name,
        age: payload.age,
        email: payload.email.map(|e| e.trim().to_lowercase()),
        gender: payload.gender,
        address: payload.address,
        role: payload.role,
        password_hash,
    };

    let outcome = with_tx(&state.db, move |conn| {
        Box::pin(async move {
            let Some(current) = repo::find_by_id(conn, user_id).await? else {
                return Ok(UpdateOutcome::NotFound);
            };
            if let Some(new_email) = changes.email.as_deref() {
                if new_email != current.email {
                    if let Some(existing) =
                        repo::find_by_email_for_login(conn, new_email).await?
                    {
                        if existing.id != user_id {
                            return Ok(UpdateOutcome::EmailInUse);
                        }
                    }
                }
            }
            repo::update(conn, user_id, &changes).await?;
            Ok(UpdateOutcome::Done)
        })
    })
    .await?;

    match outcome {
        UpdateOutcome::NotFound => Err(ApiError::NotFound("user not found".into())),
        UpdateOutcome::EmailInUse => Err(ApiError::Conflict {
            message: "the new email is already in use by another account".into(),
            detail: None,
        }),
        UpdateOutcome::Done => {
            info!(user_id, caller_id, "user updated");
            Ok(Json(json!({ "message": "user updated successfully" })))
        }
    }
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    // A delete of a user still referenced by monitoring rows trips the
    // foreign key constraint and surfaces as a 409.
    let deleted = with_tx(&state.db, move |conn| {
        Box::pin(async move {
            if repo::find_by_id(conn, user_id).await?.is_none() {
                return Ok(false);
            }
            Ok(repo::delete(conn, user_id).await? > 0)
        })
    })
    .await?;

    if !deleted {
        return Err(ApiError::NotFound("user not found".into()));
    }
    info!(user_id, caller_id, "user deleted");
    Ok(Json(json!({ "message": "user deleted successfully" })))
}

#[instrument(skip(state))]
async fn list_patients(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
) -> Result<Json<Vec<Patient>>, ApiError> {
    tracing::debug!(caller_id, "listing patients");
    let patients = with_tx(&state.db, |conn| Box::pin(repo::patients(conn))).await?;
    Ok(Json(patients))
}
