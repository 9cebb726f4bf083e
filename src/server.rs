use crate::envelope::{
    timestamp_now, AckEnvelope, CacheInfoEnvelope, HealthEnvelope, ResponseEnvelope,
};
use crate::error::FinderError;
use crate::metrics;
use crate::service::{QueryService, RawSearchParams, SearchRequest};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, Method, Uri},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    pub source: Option<String>,
}

/// API description
async fn api_info() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "PsyFinder API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Psytrance event finder",
        "endpoints": {
            "/events": "Search events (query, location, genre, source, force_refresh, psy)",
            "/events?source=clubberia": "Tokyo club events, Psy-screened",
            "/events?source=major": "Major festivals",
            "/events/refresh": "Refresh cached collections in the background (POST)",
            "/cache/info": "Cache state per source",
            "/cache": "Clear the cache (DELETE)",
            "/health": "Health check",
            "/metrics": "Prometheus metrics"
        },
        "timestamp": timestamp_now()
    }))
}

async fn search_events(
    State(state): State<AppState>,
    params: Result<Query<RawSearchParams>, QueryRejection>,
) -> Result<Json<ResponseEnvelope>, FinderError> {
    let Query(params) = params.map_err(|e| FinderError::Validation(e.body_text()))?;
    let request = SearchRequest::try_from(params).map_err(|e| {
        metrics::record_validation_error();
        e
    })?;
    let envelope = state.service.search(request).await?;
    Ok(Json(envelope))
}

async fn refresh_events(
    State(state): State<AppState>,
    params: Result<Query<RefreshParams>, QueryRejection>,
) -> Result<Json<AckEnvelope>, FinderError> {
    let Query(params) = params.map_err(|e| FinderError::Validation(e.body_text()))?;
    let scheduled = state.service.trigger_refresh(params.source)?;
    let message = if scheduled {
        "Cache refresh started in background"
    } else {
        "Cache refresh already in progress"
    };
    Ok(Json(AckEnvelope::new(message)))
}

async fn cache_info(State(state): State<AppState>) -> Json<CacheInfoEnvelope> {
    Json(CacheInfoEnvelope {
        success: true,
        cache_info: state.service.cache_info(),
        timestamp: timestamp_now(),
    })
}

async fn clear_cache(State(state): State<AppState>) -> Json<AckEnvelope> {
    state.service.clear_cache();
    Json(AckEnvelope::new("Cache cleared successfully"))
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthEnvelope> {
    Json(state.service.health())
}

async fn prometheus_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

async fn not_found(uri: Uri) -> FinderError {
    FinderError::NotFound(uri.path().to_string())
}

/// Create the HTTP server with all routes. Paths the API does not claim are
/// served from `static_dir` when it exists.
pub fn create_server(service: Arc<QueryService>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let router = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // The same contract under every path the frontends have used
        .route("/events", get(search_events))
        .route("/api/events", get(search_events))
        .route("/api/search", get(search_events))
        .route("/events/refresh", post(refresh_events))
        .route("/api/events/refresh", post(refresh_events))
        .route("/cache/info", get(cache_info))
        .route("/cache", delete(clear_cache));

    let router = match static_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    router
        .with_state(AppState { service })
        .layer(ServiceBuilder::new().layer(cors))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}

/// Start the HTTP server on the given address
pub async fn start_server(
    service: Arc<QueryService>,
    addr: SocketAddr,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let app = create_server(service, static_dir);

    info!("HTTP server running on http://{addr}");
    info!("Health check: http://{addr}/health");
    info!("Events:       http://{addr}/events");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
