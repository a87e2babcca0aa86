//! Premium API Server
//!
//! Calculates insurance premiums from records held by independent record
//! stores (policies, customers, coverages and regions). Nothing is persisted
//! here; every calculation fetches what it needs and runs the calculator.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod error;
mod handlers;



use adapters::{
    HttpCoverageClient, HttpCustomerClient, HttpPolicyClient, HttpRegionClient, RecordStoreHttp,
};
use app::PremiumService;
use auth::AccessGuard;
use config::Config;

pub type HttpPremiumService =
    PremiumService<HttpPolicyClient, HttpCustomerClient, HttpRegionClient, HttpCoverageClient>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub premium_service: Arc<HttpPremiumService>,
    pub access_guard: Arc<AccessGuard>,
}

impl AppState {
    /// Wire the record store clients and the access guard from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = |url: &str| -> anyhow::Result<RecordStoreHttp> {
            let http = RecordStoreHttp::new(url, &config.upstream)
                .with_context(|| format!("Failed to build record store client for {}", url))?;
            tracing::debug!(base_url = %http.base_url(), "Record store client ready");
            Ok(http)
        };

        let policies = Arc::new(HttpPolicyClient::new(store(&config.policy_store_url)?));
        let customers = Arc::new(HttpCustomerClient::new(store(&config.customer_store_url)?));
        let regions = Arc::new(HttpRegionClient::new(store(&config.region_store_url)?));
        let coverages = Arc::new(HttpCoverageClient::new(store(&config.coverage_store_url)?));

        let premium_service = Arc::new(PremiumService::new(
            policies,
            customers,
            regions,
            coverages,
            config.request_deadline,
        ));

        Ok(Self {
            premium_service,
            access_guard: Arc::new(AccessGuard::from_config(config)),
        })
    }
}

/// Per-client-IP limits for the calculation endpoint
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router
///
/// Rate limiting keys on the peer address, so it needs a server started with
/// `into_make_service_with_connect_info`.
pub fn build_router(state: AppState, rate_limit: Option<RateLimit>) -> anyhow::Result<Router> {
    let mut protected = Router::new()
        .route("/premium/calculate", post(handlers::calculate_premium))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    if let Some(limit) = rate_limit {
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(limit.per_second)
                .burst_size(limit.burst)
                .finish()
                .context("Failed to build governor config")?,
        );
        protected = protected.layer(GovernorLayer {
            config: governor_config,
        });
    }

    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(protected)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,premium_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Premium API...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        policy_store = %config.policy_store_url,
        customer_store = %config.customer_store_url,
        coverage_store = %config.coverage_store_url,
        region_store = %config.region_store_url,
        deadline_ms = config.request_deadline.as_millis() as u64,
        "Record stores configured"
    );

    let state = AppState::from_config(&config)?;
    let app = build_router(
        state,
        Some(RateLimit {
            per_second: config.rate_limit_per_second,
            burst: config.rate_limit_burst,
        }),
    )?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}
