//! Local fixture backend serving `GET /{source}` from `{dir}/{source}.json`.
//!
//! Stands in for the three source endpoints during development and in tests.

use crate::domain::SourceType;
use crate::error::{FeedError, Result};
use axum::{
    extract::Path as UrlPath,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct FixtureDir(Arc<PathBuf>);

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "activity-feed-fixtures",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn source_records(
    Extension(FixtureDir(dir)): Extension<FixtureDir>,
    UrlPath(name): UrlPath<String>,
) -> Response {
    let Ok(source) = name.parse::<SourceType>() else {
        return (StatusCode::NOT_FOUND, format!("unknown source '{}'", name)).into_response();
    };

    let path = dir.join(format!("{}.json", source.as_str()));
    let content = match tokio::fs::read(&path).await {
        Ok(content) => content,
        Err(e) => {
            warn!("No fixture for {} at {}: {}", source, path.display(), e);
            return (StatusCode::NOT_FOUND, format!("no fixture for '{}'", source)).into_response();
        }
    };

    // Serve the file as-is, but refuse anything that is not JSON at all.
    if let Err(e) = serde_json::from_slice::<serde_json::Value>(&content) {
        warn!("Fixture {} is not valid JSON: {}", path.display(), e);
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("invalid fixture for '{}'", source))
            .into_response();
    }

    ([(header::CONTENT_TYPE, "application/json")], content).into_response()
}

/// Router with `/health` and one route per source.
pub fn create_router(dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/:source", get(source_records))
        .layer(Extension(FixtureDir(Arc::new(dir))))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Bind `addr` and serve in a background task; returns the bound address.
pub async fn spawn_server(
    dir: PathBuf,
    addr: SocketAddr,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = create_router(dir);
    let server = Server::try_bind(&addr)
        .map_err(|e| FeedError::Config(format!("cannot bind fixture server to {}: {}", addr, e)))?
        .serve(app.into_make_service());
    let bound = server.local_addr();

    let handle = tokio::spawn(async move {
        if let Err(e) = server.await {
            warn!("Fixture server stopped: {}", e);
        }
    });
    Ok((bound, handle))
}

/// Serve until the process is stopped.
pub async fn serve(dir: PathBuf, addr: SocketAddr) -> Result<()> {
    let (bound, handle) = spawn_server(dir.clone(), addr).await?;
    info!("Serving fixtures from {} on http://{}", dir.display(), bound);
    for source in SourceType::ALL {
        info!("  GET http://{}{}", bound, source.default_path());
    }
    handle
        .await
        .map_err(|e| FeedError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}
