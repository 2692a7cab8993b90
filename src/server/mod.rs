// Relevanssi HTTP server
// Serves the search endpoint over the configured content store

pub mod handlers;
pub mod middleware;

use crate::config::{Config, ServerConfig};
use crate::response::ResponseAssembler;
use crate::store::Store;
use crate::SEARCH_ROUTE;
use anyhow::{Context, Result};
use axum::Router as AxumRouter;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Relevanssi HTTP server state
#[derive(Clone)]
pub struct ServerState {
    pub assembler: Arc<ResponseAssembler>,
}

impl ServerState {
    pub fn new(assembler: ResponseAssembler) -> Self {
        Self {
            assembler: Arc::new(assembler),
        }
    }
}

/// Initialize logging for the server
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "relevanssi_rest=debug,tower=warn,axum=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the HTTP server until interrupted
pub fn run_server(config: &Config) -> Result<()> {
    // Initialize runtime
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let store = Arc::new(Store::new(config)?);
        let state = ServerState::new(ResponseAssembler::with_store(store, config));

        let app = build_router(state);

        let listener = bind_listener(&config.server).await?;
        let addr = listener.local_addr()?;
        tracing::info!("Relevanssi HTTP Server listening on http://{}", addr);
        tracing::info!("  GET  {}  - Search", SEARCH_ROUTE);
        tracing::info!("  Pagination links point at {}", config.search_endpoint_url());
        tracing::info!("  Content database: {}", config.database_path.display());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server stopped");
        Ok::<(), anyhow::Error>(())
    })
}

/// Bind the configured host and port. Host names are resolved; a host that
/// does not resolve is an error.
pub async fn bind_listener(server: &ServerConfig) -> Result<TcpListener> {
    TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", server.host, server.port))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Build the router with the search endpoint
pub fn build_router(state: ServerState) -> AxumRouter {
    use axum::http::Method;
    use axum::routing::get;
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    AxumRouter::new()
        .route(SEARCH_ROUTE, get(handlers::search))
        .layer(axum::middleware::from_fn(middleware::trace_request_mw))
        .layer(cors)
        .with_state(state)
}
