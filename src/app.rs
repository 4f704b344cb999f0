use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, faq, inference, monitoring, sensors, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .merge(monitoring::router())
                .merge(sensors::router())
                .merge(faq::router())
                .merge(inference::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::auth::jwt::JwtKeys;

    fn app() -> Router {
        build_app(AppState::fake())
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_reject_a_missing_token() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn an_unverifiable_token_is_still_401() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/api/monitoring/me")
                    .header(header::AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authentication_runs_before_body_validation() {
        // No token and an incomplete body: the 401 wins because the token
        // check happens first.
        let res = app()
            .oneshot(json_request("POST", "/api/monitoring/save", r#"{}"#))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_a_400_before_any_store_access() {
        // The fake state's store is unreachable; a 400 here proves the
        // validation boundary fires first.
        let res = app()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                r#"{"email":"a@x.com"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn registration_with_missing_fields_is_a_400() {
        let res = app()
            .oneshot(json_request(
                "POST",
                "/api/users",
                r#"{"name":"A","email":"a@x.com"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sensor_batch_update_with_a_missing_field_mutates_nothing() {
        let res = app()
            .oneshot(json_request(
                "PATCH",
                "/api/sensors/update",
                r#"{"glucose":130}"#,
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn faq_create_with_missing_fields_is_a_400() {
        let res = app()
            .oneshot(json_request("POST", "/api/faq", r#"{"judul":"T"}"#))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn a_valid_token_with_the_store_down_yields_503() {
        let state = AppState::fake();
        let token = JwtKeys::new(&state.config.jwt.secret, state.config.jwt.ttl_days)
            .sign(1)
            .expect("sign");
        let res = build_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn inference_endpoints_degrade_to_503_without_artifacts() {
        let body = r#"{
            "gender": 1, "age": 45, "hypertension": 0, "heart_disease": 0,
            "smoking_history": 2, "berat": 70, "tinggi": 175,
            "hba1c_level": 5.8, "blood_glucose": 120
        }"#;
        let res = app()
            .oneshot(json_request("POST", "/api/ml/predict", body))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
