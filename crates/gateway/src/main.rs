//! eCFR Atlas API Gateway
//!
//! The single process behind the service:
//! - Agency browsing and search endpoints
//! - Per-title word-count lookups
//! - AI agency summary pass-through (rate limited)
//! - Static single-page browser client
//! - Observability (logging, metrics, request IDs)

mod extractors;
mod handlers;
mod middleware;

use axum::{
    error_handling::HandleErrorLayer,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    routing::{get, post},
    Router,
};
use ecfr_common::{
    config::AppConfig,
    db::DbPool,
    metrics,
    summary::{OpenAiSummarizer, Summarizer},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub summarizer: Arc<dyn Summarizer>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting eCFR Atlas gateway v{}", ecfr_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Summary provider client
    let summarizer: Arc<dyn Summarizer> = Arc::new(OpenAiSummarizer::new(&config.openai)?);

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        summarizer,
    };

    // Build the router
    let app = create_router(state, prometheus);

    // Start the server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(
    state: AppState,
    prometheus: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    // CORS configuration: the static client is served from this process,
    // but the API stays open for external tooling like the original
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // AI routes get their own rate limiter
    let limiter = middleware::rate_limit::create_rate_limiter(
        state.config.rate_limit.requests_per_second,
        state.config.rate_limit.burst,
    );

    let mut summary_routes =
        Router::new().route("/ai/agency-summary", post(handlers::summary::agency_summary));

    if state.config.rate_limit.enabled {
        summary_routes = summary_routes.route_layer(axum::middleware::from_fn(
            move |request: Request, next: Next| {
                let limiter = limiter.clone();
                async move {
                    middleware::rate_limit::rate_limit_middleware(limiter, request, next).await
                }
            },
        ));
    }

    let metrics_handle = prometheus.clone();

    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Agency endpoints
        .route("/agencies", get(handlers::agencies::list_agencies))
        // Word count endpoints
        .route(
            "/word-counts/{title}",
            get(handlers::word_counts::title_word_counts),
        )
        .route(
            "/word-counts/{title}/{chapter}",
            get(handlers::word_counts::chapter_word_count),
        )
        // AI endpoints
        .merge(summary_routes)
        // Prometheus scrape endpoint
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        );

    let static_dir = state.config.server.static_dir.clone();
    let request_timeout = state.config.request_timeout();

    // Compose the app: API routes first, static browser client for
    // everything else
    Router::new()
        .merge(api_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            middleware::request_metrics::track_requests,
        ))
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Convert timeout-layer errors into plain status responses
async fn handle_middleware_error(err: BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
