//! The HTTP surface of the fault detector: a liveness ping, the versioned status endpoint and
//! the Prometheus metrics exposition.

use std::net::SocketAddr;

use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use op_fault_detector_core::FaultStatus;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// The state every request handler has access to.
#[derive(Clone)]
struct ApiState {
    status: FaultStatus,
    metrics: PrometheusHandle,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct PingResponse {
    message: &'static str,
}

/// Builds the application router. Versioned routes are mounted under `base_path`; versions
/// without defined routes are skipped with a warning.
pub fn router(
    base_path: &str,
    versions: &[String],
    status: FaultStatus,
    metrics: PrometheusHandle,
) -> Router {
    let mut versioned = Router::new();
    for version in versions {
        match version.as_str() {
            "v1" => versioned = versioned.nest("/v1", v1_router()),
            other => {
                tracing::warn!(
                    target: "faultdetector::api",
                    version = other,
                    "no routes and handlers defined for version, verify the api config"
                );
            }
        }
    }

    let base_path = if base_path.starts_with('/') {
        base_path.to_string()
    } else {
        format!("/{base_path}")
    };

    Router::new()
        .route("/ping", get(get_ping))
        .route("/metrics", get(get_metrics))
        .nest(&base_path, versioned)
        .with_state(ApiState { status, metrics })
}

fn v1_router() -> Router<ApiState> {
    Router::new().route("/status", get(get_status))
}

/// Serves the router until the cancellation token fires, then shuts down gracefully.
pub async fn serve(
    addr: SocketAddr,
    router: Router,
    cancellation: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "faultdetector::api", %addr, "starting the http server");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancellation.cancelled().await })
        .await
}

async fn get_ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse { ok: !state.status.is_fault_detected() })
}

async fn get_metrics(State(state): State<ApiState>) -> String {
    state.metrics.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn test_router(status: FaultStatus) -> Router {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        router("/api", &["v1".to_string()], status, handle)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response =
            router.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_ping() {
        let (status, body) = get_json(test_router(FaultStatus::new()), "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "message": "pong" }));
    }

    #[tokio::test]
    async fn test_status_ok_when_no_fault_detected() {
        let (status, body) = get_json(test_router(FaultStatus::new()), "/api/v1/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_status_not_ok_when_diverged() {
        let fault_status = FaultStatus::new();
        fault_status.set_diverged(true);

        let (status, body) = get_json(test_router(fault_status), "/api/v1/status").await;
        // Divergence is reported in the payload, not via the http status code.
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "ok": false }));
    }

    #[tokio::test]
    async fn test_unregistered_version_is_not_mounted() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let router = router("/api", &["v2".to_string()], FaultStatus::new(), handle);

        let response = router
            .oneshot(Request::builder().uri("/api/v2/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let response = test_router(FaultStatus::new())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
