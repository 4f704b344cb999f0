use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser},
        jwt::JwtKeys,
        password::verify_password,
    },
    db::with_tx,
    error::ApiError,
    state::AppState,
    users::repo,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => {
            (e.trim().to_lowercase(), p)
        }
        _ => {
            return Err(ApiError::Validation(
                "email and password are required".into(),
            ))
        }
    };

    if !is_valid_email(&email) {
        warn!(%email, "login with invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }

    let lookup = email.clone();
    let user = with_tx(&state.db, move |conn| {
        Box::pin(async move { repo::find_by_email_for_login(conn, &lookup).await })
    })
    .await?;

    let Some(user) = user else {
        warn!(%email, "login with unknown email");
        return Err(ApiError::Unauthenticated(
            "invalid email or password".into(),
        ));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(%email, user_id = user.id, "login with wrong password");
        return Err(ApiError::Unauthenticated(
            "invalid email or password".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = user.id, %email, "user logged in");
    Ok(Json(LoginResponse {
        message: "login successful".into(),
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}
