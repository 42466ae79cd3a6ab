use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use vehicle_cancellation::workflows::cancellation::{
    cancellation_router, AlertPublisher, CancellationService, RequestRepository,
};

pub(crate) fn with_cancellation_routes<R, A>(
    service: Arc<CancellationService<R, A>>,
) -> axum::Router
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    cancellation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryAlertPublisher, InMemoryRequestRepository};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;
    use vehicle_cancellation::workflows::cancellation::SettingsStore;

    fn app_state() -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn app(state: AppState) -> axum::Router {
        let service = CancellationService::new(
            Arc::new(InMemoryRequestRepository::default()),
            Arc::new(InMemoryAlertPublisher::default()),
            Arc::new(SettingsStore::default()),
        );
        with_cancellation_routes(Arc::new(service)).layer(Extension(state))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let state = app_state();
        let router = app(state.clone());

        let response = router
            .clone()
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = router.oneshot(get("/ready")).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_settings_share_one_router() {
        let router = app(app_state());

        let response = router
            .clone()
            .oneshot(get("/health"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(get("/api/v1/settings"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        let settings: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(settings["default_settlement_days"], 15);
        assert_eq!(settings["notifications"]["notify_before_days"], 3);
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(app_state())
            .oneshot(get("/metrics"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
