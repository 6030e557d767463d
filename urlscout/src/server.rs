// HTTP front end: the crawl and probe operations as JSON endpoints

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use urlscout_core::api::{
    ApiLimits, CrawlRequest, ProbeRequest, handle_crawl_request, handle_probe_request,
};
use urlscout_core::probe::ProbeConfig;
use urlscout_scanner::FetchConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub fetch: FetchConfig,
    pub probe: ProbeConfig,
    pub limits: ApiLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            fetch: FetchConfig::default(),
            probe: ProbeConfig::default(),
            limits: ApiLimits::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub fetch: FetchConfig,
    pub probe: ProbeConfig,
    pub limits: ApiLimits,
}

impl From<&ServerConfig> for AppState {
    fn from(config: &ServerConfig) -> Self {
        Self {
            fetch: config.fetch.clone(),
            probe: config.probe.clone(),
            limits: config.limits,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/crawl", get(crawl_handler))
        .route("/api/probe", post(probe_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, build_app(state))
        .await
        .context("Server error")
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!("Starting server on {}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    serve(listener, AppState::from(&config)).await
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn crawl_handler(
    State(state): State<AppState>,
    Query(request): Query<CrawlRequest>,
) -> impl IntoResponse {
    let (code, body) = handle_crawl_request(&request, &state.fetch, &state.limits).await;
    (status_code(code), Json(body))
}

async fn probe_handler(
    State(state): State<AppState>,
    Json(request): Json<ProbeRequest>,
) -> impl IntoResponse {
    let (code, body) = handle_probe_request(request, &state.probe, &state.limits).await;
    (status_code(code), Json(body))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
