//! Configuration routes: package download, validation, export and import.

use axum::{
    Json, Router,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::WithRejection;
use botweaver_common::{
    error::{BotWeaverError, BotWeaverResult},
    models::{BotConfig, ExportedConfig, import_config},
    validation::{ValidationReport, validate_bot_config},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use super::BotConfigBody;
use crate::{AppState, package};

type JsonBody<T> = WithRejection<Json<T>, BotWeaverError>;

/// Configuration routes, nested under `/api/bot`.
pub fn router() -> axum::Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/validate", post(validate))
        .route("/export", post(export))
        .route("/import", post(import))
}

fn require_name(config: &BotConfig) -> BotWeaverResult<()> {
    if config.has_name() {
        Ok(())
    } else {
        Err(BotWeaverError::bad_request("Bot configuration is required"))
    }
}

/// POST /api/bot/generate: Download the generated project as a zip.
async fn generate(WithRejection(Json(body), _): JsonBody<BotConfigBody>) -> BotWeaverResult<Response> {
    let config = body.into_config()?;
    require_name(&config)?;

    let artifact = botweaver_codegen::generate(&config)?;
    let files = artifact.files.len();
    let archive = tokio::task::spawn_blocking(move || package::zip_project(&artifact))
        .await
        .map_err(|e| BotWeaverError::Internal(e.into()))?
        .map_err(|e| BotWeaverError::Generation { detail: e.to_string() })?;

    info!(bot = %config.slug(), files, bytes = archive.len(), "Generated bot package");

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, package::attachment(&config.name, "-bot.zip")),
        ],
        archive,
    )
        .into_response())
}

/// POST /api/bot/validate: Itemized check; 400 when anything is missing.
async fn validate(
    WithRejection(Json(body), _): JsonBody<BotConfigBody>,
) -> BotWeaverResult<(axum::http::StatusCode, Json<ValidationReport>)> {
    let config = body.into_config()?;
    let report = validate_bot_config(&config);
    debug!(valid = report.valid, errors = report.errors.len(), "Validated bot configuration");

    let status = if report.valid {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::BAD_REQUEST
    };
    Ok((status, Json(report)))
}

/// POST /api/bot/export: Shareable configuration document, token blanked.
async fn export(WithRejection(Json(body), _): JsonBody<BotConfigBody>) -> BotWeaverResult<Response> {
    let config = body.into_config()?;
    require_name(&config)?;

    let document = ExportedConfig::new(&config, Utc::now());
    Ok((
        [(header::CONTENT_DISPOSITION, package::attachment(&config.name, "-config.json"))],
        Json(document),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportBody {
    #[serde(default)]
    config_data: Value,
}

/// POST /api/bot/import: Rebuild a configuration from an uploaded document.
async fn import(WithRejection(Json(body), _): JsonBody<ImportBody>) -> BotWeaverResult<Json<Value>> {
    let config = import_config(body.config_data)?;
    debug!(bot = %config.slug(), commands = config.commands.len(), "Imported configuration");

    Ok(Json(json!({
        "success": true,
        "message": "Configuration imported successfully",
        "config": config,
    })))
}
