//! HTTP front end.
//!
//! Endpoints:
//!   POST /cluster  → run a clustering request, see [`crate::dispatch`]
//!   GET  /health   → liveness probe
//!   GET  /*        → static front-end bundle, when the directory exists
//!
//! Clustering is CPU-bound, so each request runs on tokio's blocking pool.
//! Errors are returned as `{"detail": "..."}` with status 400 for request
//! problems and 500 for failures inside the computation.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::config::Config;
use crate::dispatch::{ClusterDispatcher, ClusterError, ClusterRequest};

type AppState = Arc<ClusterDispatcher>;

/// Build the application router.
///
/// Static files are served from `static_dir` as a fallback when it is a directory.
pub fn router(dispatcher: ClusterDispatcher, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/cluster", post(cluster_points))
        .route("/health", get(health));

    let app = match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "serving static assets");
            app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        _ => app,
    };

    app.layer(CorsLayer::permissive())
        .with_state(Arc::new(dispatcher))
}

/// Bind to the configured address and serve until the process is stopped.
pub async fn serve(config: &Config) -> std::io::Result<()> {
    let addr = config.addr();
    let app = router(config.dispatcher(), Some(&config.static_dir));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "plotcluster listening");
    axum::serve(listener, app).await
}

impl IntoResponse for ClusterError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

// POST /cluster
async fn cluster_points(
    State(dispatcher): State<AppState>,
    Json(request): Json<ClusterRequest>,
) -> Response {
    let algorithm = request.algorithm.clone();
    let n_points = request.points.len();

    let outcome = tokio::task::spawn_blocking(move || dispatcher.cluster(&request)).await;
    match outcome {
        Ok(Ok(result)) => {
            info!(algorithm = %algorithm, n_points, "clustered");
            Json(result).into_response()
        }
        Ok(Err(e)) => e.into_response(),
        Err(join_err) => {
            // The computation panicked; report it like any other algorithm failure.
            error!(algorithm = %algorithm, n_points, error = %join_err, "clustering task aborted");
            ClusterError::AlgorithmFailure(join_err.to_string()).into_response()
        }
    }
}

// GET /health
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ClusterResult;
    use serde_json::Value;

    fn state() -> State<AppState> {
        State(Arc::new(ClusterDispatcher {
            seed: Some(42),
            ..ClusterDispatcher::default()
        }))
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn cluster_ok() {
        let req = ClusterRequest::new("kmeans", vec![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]])
            .with_k(2);
        let resp = cluster_points(state(), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let result: ClusterResult = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(result.algorithm, "kmeans");
        assert_eq!(result.labels.len(), 4);
        assert_eq!(result.centroids.len(), 2);
    }

    #[tokio::test]
    async fn validation_errors_are_bad_request() {
        let req = ClusterRequest::new("kmeans", Vec::new());
        let resp = cluster_points(state(), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["detail"], "no points supplied");

        let req = ClusterRequest::new("spectral", vec![[0.0, 0.0]]);
        let resp = cluster_points(state(), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let detail = body_json(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("kmeans, agglomerative, dbscan"));
    }

    #[tokio::test]
    async fn algorithm_failures_are_server_errors() {
        let req = ClusterRequest::new("dbscan", vec![[0.0, 0.0]]).with_eps(-1.0);
        let resp = cluster_points(state(), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body_json(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("epsilon"));
    }

    #[tokio::test]
    async fn dbscan_response_shape() {
        let req = ClusterRequest::new("dbscan", vec![[0.0, 0.0], [0.0, 0.1], [0.0, 0.2]]).with_min_samples(2);
        let resp = cluster_points(state(), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["labels"], json!([0, 0, 0]));
        assert_eq!(body["centroids"], json!([]));
        assert_eq!(body["algorithm"], "dbscan");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = health().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[test]
    fn router_builds_without_static_dir() {
        let _ = router(ClusterDispatcher::default(), None);
        let _ = router(ClusterDispatcher::default(), Some(Path::new("/definitely/not/here")));
    }
}
