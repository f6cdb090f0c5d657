//! API route modules.

pub mod bot;
pub mod health;
pub mod hosting;

use axum::http::Uri;
use botweaver_common::error::{BotWeaverError, BotWeaverResult};
use botweaver_common::models::BotConfig;
use serde::Deserialize;
use serde_json::Value;

/// `{ "botConfig": { ... } }`, the envelope most endpoints accept.
///
/// The configuration stays untyped until [`BotConfigBody::into_config`] so
/// every default and coercion is applied in one place.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfigBody {
    #[serde(default)]
    pub bot_config: Value,
}

impl BotConfigBody {
    pub fn into_config(self) -> BotWeaverResult<BotConfig> {
        BotConfig::from_json(self.bot_config)
    }
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> BotWeaverError {
    BotWeaverError::not_found(format!("Route '{}'", uri.path()))
}
