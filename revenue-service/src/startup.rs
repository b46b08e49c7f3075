//! Application startup and lifecycle management.

use crate::config::{RevenueConfig, StoreBackend};
use crate::handlers;
use crate::services::{
    init_metrics, Clock, Database, MemoryStore, PeriodResolver, RevenueAggregator, RevenueStore,
    SequenceGenerator, SystemClock,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RevenueConfig,
    pub store: Arc<dyn RevenueStore>,
    pub clock: Arc<dyn Clock>,
    pub aggregator: Arc<RevenueAggregator>,
    pub sequences: Arc<SequenceGenerator>,
}

impl AppState {
    pub fn new(config: RevenueConfig, store: Arc<dyn RevenueStore>, clock: Arc<dyn Clock>) -> Self {
        let periods = PeriodResolver::new(config.locale);
        Self {
            aggregator: Arc::new(RevenueAggregator::new(store.clone(), periods)),
            sequences: Arc::new(SequenceGenerator::new(store.clone())),
            config,
            store,
            clock,
        }
    }
}

/// Routes with middleware applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/dashboard/summary", get(handlers::dashboard_summary))
        .route("/dashboard/quarter", get(handlers::dashboard_quarter))
        .route("/dashboard/charts", get(handlers::dashboard_charts))
        .route("/quotes/next-number", get(handlers::next_quote_number))
        .route("/quotes/numbers/validate", post(handlers::validate_quote_number))
        .route("/invoices", get(handlers::list_invoices))
        .route("/invoices/next-number", get(handlers::next_invoice_number))
        .route("/invoices/numbers/validate", post(handlers::validate_invoice_number))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn connect_store(config: &RevenueConfig) -> Result<Arc<dyn RevenueStore>, AppError> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let database = config.database.as_ref().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("Database configuration missing"))
            })?;
            let db = Database::new(
                &database.url,
                database.max_connections,
                database.min_connections,
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                e
            })?;
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
            Ok(Arc::new(db))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: RevenueConfig) -> Result<Self, AppError> {
        init_metrics();

        let store = connect_store(&config).await?;
        let state = AppState::new(config.clone(), store, Arc::new(SystemClock));
        let router = build_router(state);

        let addr: SocketAddr = format!("{}:{}", config.common.host, config.common.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid bind address: {}", e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Revenue service listener bound");

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
