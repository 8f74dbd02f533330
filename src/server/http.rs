//! Read-only HTTP surface over the engine: a downstream consumer of analysis
//! state, with no analysis logic of its own.

use crate::app::dto::ApiErrorBody;
use crate::app::engine::AnalysisEngine;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct HttpState {
    pub engine: AnalysisEngine,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

pub fn build_router(engine: AnalysisEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/summary", get(summary))
        .route("/report", get(report))
        .route("/analyze", post(analyze))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: AnalysisEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving analysis results");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn summary(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    match state.engine.last_summary() {
        Some(summary) => Json((*summary).clone()).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "no run has completed yet").into_response(),
    }
}

async fn report(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    match state.engine.last_report() {
        Some(report) => Json((*report).clone()).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "no report available yet").into_response(),
    }
}

/// On-demand analysis of the store as-is; partial until the run is quiescent.
async fn analyze(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    match state.engine.analyze_now() {
        Ok(report) => Json((*report).clone()).into_response(),
        Err(err) => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, format!("{err:#}")).into_response()
        }
    }
}
