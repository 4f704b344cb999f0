use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;

/// Request-level error taxonomy. Every handler returns this; the
/// `IntoResponse` impl is the single place errors become status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict {
        message: String,
        detail: Option<String>,
    },
    #[error("{0}")]
    Unavailable(String),
    #[error("a database error occurred")]
    Store { detail: String },
    #[error("an unexpected error occurred on the server")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => {
                ApiError::Unavailable("database connection failed".into())
            }
            StoreError::Duplicate { detail } => ApiError::Conflict {
                message: "a record with the same unique value already exists".into(),
                detail: Some(detail),
            },
            StoreError::ForeignKey { detail } => ApiError::Conflict {
                message: "the record cannot be changed because it is still in use".into(),
                detail: Some(detail),
            },
            StoreError::Other { detail } => ApiError::Store { detail },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store errors keep the underlying text in the body as a diagnostic;
        // it is not a stable contract for clients.
        let mut body = json!({ "message": self.to_string() });
        match &self {
            ApiError::Store { detail } => {
                body["error"] = json!(detail);
            }
            ApiError::Conflict {
                detail: Some(detail),
                ..
            } => {
                body["error"] = json!(detail);
            }
            ApiError::Internal(source) => {
                error!(error = %source, "unhandled internal error");
            }
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            ApiError::Unauthenticated("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Validation("missing field".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("user not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict {
                message: "duplicate".into(),
                detail: None
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unavailable("store down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Store { detail: "x".into() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_and_foreign_key_map_to_conflict() {
        let dup = ApiError::from(StoreError::Duplicate {
            detail: "duplicate key value violates unique constraint".into(),
        });
        assert_eq!(dup.status(), StatusCode::CONFLICT);

        let fk = ApiError::from(StoreError::ForeignKey {
            detail: "violates foreign key constraint".into(),
        });
        assert_eq!(fk.status(), StatusCode::CONFLICT);

        assert_eq!(
            ApiError::from(StoreError::Unavailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn store_error_body_carries_message_and_detail() {
        let resp = ApiError::from(StoreError::Other {
            detail: "relation does not exist".into(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["message"], "a database error occurred");
        assert_eq!(body["error"], "relation does not exist");
    }

    #[tokio::test]
    async fn validation_body_has_no_diagnostic_field() {
        let resp = ApiError::Validation("email and password are required".into()).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["message"], "email and password are required");
        assert!(body.get("error").is_none());
    }
}
