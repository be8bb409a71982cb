use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dvcrust::chart::{load_daily_new_cases, load_stacked_population, load_tests_overview};
use dvcrust::PipelineConfig;

#[derive(Clone)]
struct AppState {
    cfg: PipelineConfig,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    window: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    days: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dvcrust=info,dvc_api=info")),
        )
        .init();

    let cfg = PipelineConfig::from_env()?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);

    let state = AppState { cfg };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/population_stacks", get(population_stacks))
        .route("/daily_new_cases", get(daily_new_cases))
        .route("/tests_overview", get(tests_overview))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}:{}", host, port))?;
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await.context("bind failed")?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

/// Run a CSV load + aggregation on the blocking pool and map the outcome to a response.
async fn respond<T, F>(what: &'static str, job: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(Ok(v)) => (StatusCode::OK, Json(v)).into_response(),
        Ok(Err(e)) => {
            error!(source = what, "chart source failed: {e:#}");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("failed to build {what}: {e:#}")})),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("join error: {e}")})),
        )
            .into_response(),
    }
}

async fn population_stacks(State(st): State<AppState>) -> Response {
    let cfg = st.cfg.clone();
    respond("population stacks", move || load_stacked_population(&cfg)).await
}

async fn daily_new_cases(State(st): State<AppState>, Query(q): Query<WindowQuery>) -> Response {
    let cfg = st.cfg.clone();
    let window = q.window.unwrap_or(cfg.rolling_window);
    respond("daily new cases", move || load_daily_new_cases(&cfg, window)).await
}

async fn tests_overview(State(st): State<AppState>, Query(q): Query<RangeQuery>) -> Response {
    let cfg = st.cfg.clone();
    let days = q.days.unwrap_or(cfg.initial_range_days);
    respond("tests overview", move || load_tests_overview(&cfg, days)).await
}
