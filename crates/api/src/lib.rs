//! HTTP API server with observability for the read-model system.
//!
//! Exposes the query side over REST (get by id, criteria search) with
//! structured logging (tracing) and Prometheus metrics. The projector runs
//! as a background task fed by the event bus; the HTTP surface is read-only.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use event_bus::{EventBus, InMemoryEventBus};
use metrics_exporter_prometheus::PrometheusHandle;
use projector::Projector;
use query::QueryService;
use storage::{InMemoryReadModelCache, InMemoryReadModelRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::read_models::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/read-models/{model_type}/{id}", get(routes::read_models::get))
        .route(
            "/read-models/{model_type}/search",
            post(routes::read_models::search),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by in-memory storage, along with the
/// event bus feeding it and the projector that consumes the bus.
///
/// Projections are registered on the returned projector before spawning
/// [`Projector::run`] on a bus subscription.
pub fn create_default_state(
    cache_ttl: Duration,
) -> (Arc<AppState>, Arc<InMemoryEventBus>, Projector) {
    let repository = Arc::new(InMemoryReadModelRepository::new());
    let cache = Arc::new(InMemoryReadModelCache::new());

    let bus = Arc::new(InMemoryEventBus::new());
    let projector = Projector::new(repository.clone());

    let query_service = Arc::new(QueryService::new(repository, cache, cache_ttl));
    let state = Arc::new(AppState { query_service });

    (state, bus, projector)
}

/// Spawns the projector loop on a new bus subscription.
pub fn spawn_projector(projector: Projector, bus: &InMemoryEventBus) -> tokio::task::JoinHandle<()> {
    let subscription = bus.subscribe();
    tokio::spawn(async move { projector.run(subscription).await })
}
