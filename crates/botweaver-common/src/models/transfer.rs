//! Configuration export / import documents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::bot_config::BotConfig;
use crate::error::{BotWeaverError, BotWeaverResult};

/// Schema version stamped into exported documents.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Name given to imported configurations that do not carry one.
pub const IMPORTED_NAME: &str = "Imported Bot";

/// A shareable configuration: the credential is always blank.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedConfig {
    #[serde(flatten)]
    pub config: BotConfig,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

impl ExportedConfig {
    pub fn new(config: &BotConfig, timestamp: DateTime<Utc>) -> Self {
        Self {
            config: config.redacted(),
            timestamp,
            version: EXPORT_VERSION,
        }
    }
}

/// Rebuild a configuration from an uploaded document.
///
/// Every absent field takes its default and the token is cleared so the user
/// has to enter it again. Export stamps (`timestamp`, `version`) are ignored.
pub fn import_config(data: Value) -> BotWeaverResult<BotConfig> {
    let Value::Object(mut map) = data else {
        return Err(BotWeaverError::bad_request("Invalid configuration data"));
    };
    map.remove("timestamp");
    map.remove("version");

    let mut config = BotConfig::from_json(Value::Object(map))?;
    if !config.has_name() {
        config.name = IMPORTED_NAME.to_string();
    }
    config.token.clear();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn export_blanks_token_and_stamps() {
        let cfg = BotConfig::from_json(json!({
            "name": "Helper",
            "token": "abc",
            "commands": [{ "name": "ping", "type": "text", "response": "pong" }]
        }))
        .unwrap();
        let doc = serde_json::to_value(ExportedConfig::new(&cfg, Utc::now())).unwrap();
        assert_eq!(doc["token"], "");
        assert_eq!(doc["name"], "Helper");
        assert_eq!(doc["version"], EXPORT_VERSION);
        assert_eq!(doc["commands"][0]["response"], "pong");
        assert!(doc["timestamp"].is_string());
    }

    #[test]
    fn import_fills_defaults() {
        let cfg = import_config(json!({ "token": "leaked", "commands": "nope" })).unwrap();
        assert_eq!(cfg.name, IMPORTED_NAME);
        assert_eq!(cfg.token, "");
        assert_eq!(cfg.prefix, "!");
        assert!(cfg.commands.is_empty());
    }

    #[test]
    fn import_round_trips_an_export() {
        let cfg = BotConfig::from_json(json!({
            "name": "Helper",
            "prefix": "?",
            "commands": [{ "name": "ping", "response": "pong", "cooldown": 3 }]
        }))
        .unwrap();
        let doc = serde_json::to_value(ExportedConfig::new(&cfg, Utc::now())).unwrap();
        assert_eq!(import_config(doc).unwrap(), cfg);
    }

    #[test]
    fn import_rejects_non_objects() {
        assert!(import_config(json!(null)).is_err());
    }
}
