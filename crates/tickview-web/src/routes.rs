//! HTTP surface: the page, the render endpoint, and a health probe.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tickview_core::{DashboardService, RenderResult};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::WebError;
use crate::page;
use crate::session::{Gated, SessionGate};

/// Shared state for every request handler.
#[derive(Clone)]
pub struct AppState {
    service: DashboardService,
    sessions: Arc<SessionGate>,
}

impl AppState {
    pub fn new(service: DashboardService) -> Self {
        Self {
            service,
            sessions: Arc::new(SessionGate::new()),
        }
    }

    pub fn sessions(&self) -> &SessionGate {
        &self.sessions
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub seq: u64,
}

/// Body of `/api/render`. `result` is absent when a newer trigger superseded this one.
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub seq: u64,
    pub superseded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RenderResult>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/render", get(render))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(page::render(
        &Uuid::new_v4().to_string(),
        page::DEFAULT_TICKER,
    ))
}

async fn render(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Json<RenderResponse> {
    let session = query
        .session
        .as_deref()
        .filter(|session| !session.is_empty());

    // Without a session there is nothing to order against.
    let gated = match session {
        Some(session) => {
            state
                .sessions
                .run(session, query.seq, state.service.render(&query.ticker))
                .await
        }
        None => Gated::Current(state.service.render(&query.ticker).await),
    };

    let response = match gated {
        Gated::Current(result) => {
            if let RenderResult::Failure { kind, message, .. } = &result {
                tracing::warn!(?session, seq = query.seq, ?kind, %message, "render failed");
            }
            RenderResponse {
                seq: query.seq,
                superseded: false,
                result: Some(result),
            }
        }
        Gated::Superseded => RenderResponse {
            seq: query.seq,
            superseded: true,
            result: None,
        },
    };
    Json(response)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), WebError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "tickview listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("tickview stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
