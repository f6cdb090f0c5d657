//! Hosting routes: run generated bots as child processes on this machine.
//!
//! Handlers are thin: the supervisor owns the registry and every lifecycle
//! rule, these only translate to and from JSON.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use botweaver_common::error::{BotWeaverError, BotWeaverResult};
use botweaver_supervisor::{BotStatus, BotSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::BotConfigBody;
use crate::AppState;

type JsonBody<T> = WithRejection<Json<T>, BotWeaverError>;

/// Hosting routes, nested under `/api/bot`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/status/{id}", get(status))
        .route("/list", get(list))
        .route("/cleanup", post(cleanup))
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    success: bool,
    id: String,
    bot_id: String,
    message: &'static str,
}

#[derive(Debug, Deserialize)]
struct StopBody {
    #[serde(default, alias = "botId")]
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(flatten)]
    status: BotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    bot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedBot {
    #[serde(flatten)]
    summary: BotSummary,
    bot_id: String,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    bots: Vec<ListedBot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CleanupBody {
    #[serde(default)]
    action: String,
    #[serde(default)]
    bot_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CleanupResponse {
    success: bool,
    message: &'static str,
    stopped: Vec<String>,
    failed: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bot/start: Stage, install and launch a bot.
async fn start(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): JsonBody<BotConfigBody>,
) -> BotWeaverResult<Json<StartResponse>> {
    let config = body.into_config()?;
    let id = state.supervisor.start(&config).await?;
    info!(bot = %id, "Bot started");

    Ok(Json(StartResponse {
        success: true,
        bot_id: id.clone(),
        id,
        message: "Bot started successfully",
    }))
}

/// POST /api/bot/stop: Request a stop; the process exits asynchronously.
async fn stop(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): JsonBody<StopBody>,
) -> BotWeaverResult<Json<serde_json::Value>> {
    state.supervisor.stop(&body.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Bot stopped successfully",
    })))
}

/// GET /api/bot/status/{id}: Running flag plus the most recent log lines.
async fn status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Json<StatusResponse> {
    let status = state.supervisor.status(&id).await;
    let response = if status.running {
        StatusResponse { status, bot_id: Some(id), message: None }
    } else {
        StatusResponse { status, bot_id: None, message: Some("Bot not running") }
    };
    Json(response)
}

/// GET /api/bot/list: Every hosted bot, oldest first.
async fn list(State(state): State<Arc<AppState>>) -> Json<ListResponse> {
    let bots = state
        .supervisor
        .list()
        .await
        .into_iter()
        .map(|summary| ListedBot { bot_id: summary.id.clone(), summary })
        .collect();
    Json(ListResponse { bots })
}

/// POST /api/bot/cleanup: Best-effort bulk stop sent when the client page closes.
async fn cleanup(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): JsonBody<CleanupBody>,
) -> Json<CleanupResponse> {
    let report = if body.action == "stopAll" {
        state.supervisor.bulk_stop(&body.bot_ids).await
    } else {
        debug!(action = %body.action, "Ignoring unknown cleanup action");
        Default::default()
    };
    info!(stopped = report.stopped.len(), failed = report.failed.len(), "Cleanup completed");

    Json(CleanupResponse {
        success: true,
        message: "Cleanup completed",
        stopped: report.stopped,
        failed: report.failed,
    })
}
